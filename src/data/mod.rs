//! Draw history ingestion
//!
//! Reads the cleaned draw CSV produced by the scraper/cleaner pipeline and
//! turns it into a validated, chronologically ordered event sequence.
//! Malformed rows never reach the miner: they are dropped and counted.


use crate::config::DataConfig;
use crate::error::{RadarError, Result};
use crate::types::{Alphabet, Event};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{info, warn};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a draw timestamp in any of the accepted layouts
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Ordered, deduplicated draw sequence plus ingestion counters
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    events: Vec<Event>,
    /// Rows rejected as invalid events
    pub dropped: usize,
    /// Rows repeating an already-seen draw timestamp
    pub duplicates: usize,
}

impl DrawHistory {
    /// Sort chronologically (stable) and drop repeated timestamps
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.timestamp);
        let before = events.len();
        events.dedup_by_key(|e| e.timestamp);
        let duplicates = before - events.len();
        Self { events, dropped: 0, duplicates }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Last `n` draws (or all of them when fewer exist)
    pub fn tail(&self, n: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Split off the last `holdout` draws: (training, held-out)
    pub fn split_holdout(&self, holdout: usize) -> (&[Event], &[Event]) {
        let cut = self.events.len().saturating_sub(holdout);
        self.events.split_at(cut)
    }
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

/// Parse cleaned draw CSV text.
///
/// Only the flat cleaned layout is supported: one record per line, fields
/// split on `,` with surrounding quotes stripped. Quoted fields containing
/// commas are not understood.
///
/// Fails only when the header lacks the configured columns; bad rows are
/// counted in `dropped`.
pub fn parse_csv(text: &str, config: &DataConfig) -> Result<DrawHistory> {
    let alphabet: Alphabet = config.alphabet()?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| RadarError::Data("draw file is empty".into()))?;
    let columns: Vec<&str> = header.split(',').map(unquote).collect();
    let find = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| RadarError::Data(format!("missing column '{}'", name)))
    };
    let ts_idx = find(&config.timestamp_column)?;
    let cat_idx = find(&config.category_column)?;

    let mut events = Vec::new();
    let mut dropped = 0;

    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(unquote).collect();
        match parse_row(&fields, ts_idx, cat_idx, &alphabet) {
            Ok(event) => events.push(event),
            Err(e) => {
                dropped += 1;
                tracing::debug!("Row {} dropped: {}", line_no + 2, e);
            }
        }
    }

    if dropped > 0 {
        warn!("Dropped {} rows with invalid draws", dropped);
    }

    let mut history = DrawHistory::from_events(events);
    history.dropped = dropped;
    Ok(history)
}

fn parse_row(fields: &[&str], ts_idx: usize, cat_idx: usize, alphabet: &Alphabet) -> Result<Event> {
    let raw_ts = fields
        .get(ts_idx)
        .ok_or_else(|| RadarError::InvalidEvent("row too short for timestamp".into()))?;
    let raw_cat = fields
        .get(cat_idx)
        .ok_or_else(|| RadarError::InvalidEvent("row too short for category".into()))?;

    let timestamp = parse_timestamp(raw_ts)
        .ok_or_else(|| RadarError::InvalidEvent(format!("bad timestamp '{}'", raw_ts)))?;
    let category = alphabet.parse_code(raw_cat)?;
    Ok(Event::new(timestamp, category))
}

/// Load the draw history file. Failure here is fatal for a mining run.
pub async fn load_history(config: &DataConfig) -> Result<DrawHistory> {
    load_history_from(&config.history_file, config).await
}

pub async fn load_history_from(path: &Path, config: &DataConfig) -> Result<DrawHistory> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        RadarError::Data(format!("cannot read draw history {}: {}", path.display(), e))
    })?;
    let history = parse_csv(&text, config)?;
    info!(
        "Loaded {} draws from {} ({} dropped, {} duplicates)",
        history.len(),
        path.display(),
        history.dropped,
        history.duplicates
    );
    Ok(history)
}
