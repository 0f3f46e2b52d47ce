use crate::config::Config;
use crate::error::{Result, ScraperError};
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP page fetcher with a descriptive client-identification header.
///
/// No retries, no rate limiting, no caching: a failed fetch aborts that
/// venue's extraction for the run and nothing else.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.fetch_timeout_seconds))
            .build()?;
        Ok(Self { client })
    }

    /// GET a calendar page and return its raw markup.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching calendar page");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
