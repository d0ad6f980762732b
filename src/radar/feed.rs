//! Live draw sources
//!
//! The radar only needs "the draws known right now"; the feed decides where
//! they come from. Failures are surfaced as errors and the caller treats them
//! as an empty poll.

use crate::config::DataConfig;
use crate::data::{parse_csv, parse_timestamp};
use crate::error::{RadarError, Result};
use crate::types::{Alphabet, Event};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrawFeed: Send + Sync {
    /// Current batch of draws, oldest first
    async fn fetch(&self) -> Result<Vec<Event>>;
}

/// Re-reads the cleaned history file, which the ingestion job keeps appending to
pub struct FileFeed {
    path: PathBuf,
    data: DataConfig,
}

impl FileFeed {
    pub fn new(data: DataConfig) -> Self {
        Self {
            path: data.history_file.clone(),
            data,
        }
    }
}

#[async_trait]
impl DrawFeed for FileFeed {
    async fn fetch(&self) -> Result<Vec<Event>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let history = parse_csv(&text, &self.data)?;
        Ok(history.events().to_vec())
    }
}

/// Draw code as published: either a number or a string such as "00"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DrawCode {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct DrawRecord {
    timestamp: String,
    #[serde(alias = "number", alias = "code")]
    category: DrawCode,
}

/// Polls a JSON endpoint returning `[{"timestamp": "...", "category": 12}, ...]`
pub struct HttpFeed {
    http: Client,
    url: String,
    alphabet: Alphabet,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, alphabet: Alphabet) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            url: url.into(),
            alphabet,
        })
    }

    fn decode(&self, records: Vec<DrawRecord>) -> Vec<Event> {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            let category = match &record.category {
                DrawCode::Number(n) => self.alphabet.category(*n),
                DrawCode::Text(code) => self.alphabet.parse_code(code),
            };
            let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
                RadarError::InvalidEvent(format!("bad timestamp '{}'", record.timestamp))
            });
            match (timestamp, category) {
                (Ok(ts), Ok(cat)) => events.push(Event::new(ts, cat)),
                (Err(e), _) | (_, Err(e)) => tracing::warn!("Dropping feed record: {}", e),
            }
        }
        events.sort_by_key(|e| e.timestamp);
        events
    }
}

#[async_trait]
impl DrawFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<Event>> {
        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(RadarError::Data(format!(
                "draw feed returned {}",
                response.status()
            )));
        }
        let records: Vec<DrawRecord> = response.json().await?;
        Ok(self.decode(records))
    }
}

#[cfg(test)]
pub(crate) fn decode_for_test(alphabet: Alphabet, body: &str) -> Vec<Event> {
    let feed = HttpFeed {
        http: Client::new(),
        url: String::new(),
        alphabet,
    };
    let records: Vec<DrawRecord> = serde_json::from_str(body).expect("valid test body");
    feed.decode(records)
}
