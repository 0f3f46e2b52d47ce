pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod storage;
pub mod types;
pub mod venues;
