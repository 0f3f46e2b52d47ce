use crate::error::Result;
use serde::Deserialize;
use std::fs;

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descriptive client identification sent with every page fetch.
    pub user_agent: String,
    /// Hard cap on a single page fetch; expiry is treated as a fetch error.
    pub fetch_timeout_seconds: u64,
    /// Path of the SQLite concert store.
    pub database_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "concert_scraper/0.1 (concert calendar aggregator)".to_string(),
            fetch_timeout_seconds: 30,
            database_path: "concerts.db".to_string(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when the file is absent.
    pub fn load() -> Result<Self> {
        match fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(_) => Ok(Self::default()),
        }
    }
}
