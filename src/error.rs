//! Error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Notification error: {0}")]
    Notify(String),
}

impl From<config::ConfigError> for RadarError {
    fn from(e: config::ConfigError) -> Self {
        RadarError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RadarError>;
