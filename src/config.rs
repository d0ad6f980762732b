//! Configuration
//!
//! Layered as: serde defaults < TOML file < `LOTTO__SECTION__KEY` env vars.

use crate::error::{RadarError, Result};
use crate::types::{Alphabet, Category, DEFAULT_ALPHABET_SIZE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub radar: RadarConfig,
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    /// Load config from an optional TOML file plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        // .env is optional; missing file is not an error
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false))
            .add_source(
                config::Environment::with_prefix("LOTTO")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("mining.window_sizes"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let alphabet = self.data.alphabet()?;

        if self.mining.window_sizes.is_empty() {
            return Err(RadarError::Config("mining.window_sizes is empty".into()));
        }
        if let Some(w) = self.mining.window_sizes.iter().find(|w| **w < 2) {
            return Err(RadarError::Config(format!(
                "window size {} cannot hold a pair context",
                w
            )));
        }
        let mut seen = HashSet::new();
        if let Some(w) = self.mining.window_sizes.iter().find(|w| !seen.insert(**w)) {
            return Err(RadarError::Config(format!(
                "window size {} listed more than once",
                w
            )));
        }
        if self.mining.payout == 0 {
            return Err(RadarError::Config("mining.payout must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.mining.min_stability) {
            return Err(RadarError::Config(format!(
                "mining.min_stability {} outside [0, 1]",
                self.mining.min_stability
            )));
        }
        if self.radar.poll_interval_secs == 0 {
            return Err(RadarError::Config("radar.poll_interval_secs must be positive".into()));
        }
        for rule in &self.radar.chain_rules {
            if !alphabet.contains(Category::new(rule.from)) || !alphabet.contains(Category::new(rule.to)) {
                return Err(RadarError::Config(format!(
                    "chain rule {} -> {} outside alphabet of {}",
                    rule.from,
                    rule.to,
                    alphabet.size()
                )));
            }
        }
        Ok(())
    }
}

/// Draw history and rule artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    #[serde(default = "default_category_column")]
    pub category_column: String,
    #[serde(default = "default_alphabet_size")]
    pub alphabet_size: u8,
}

fn default_history_file() -> PathBuf { PathBuf::from("lotto_activo_clean.csv") }
fn default_rules_file() -> PathBuf { PathBuf::from("master_patterns.jsonl") }
fn default_timestamp_column() -> String { "DateTime".to_string() }
fn default_category_column() -> String { "Number_Int".to_string() }
fn default_alphabet_size() -> u8 { DEFAULT_ALPHABET_SIZE }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
            rules_file: default_rules_file(),
            timestamp_column: default_timestamp_column(),
            category_column: default_category_column(),
            alphabet_size: default_alphabet_size(),
        }
    }
}

impl DataConfig {
    pub fn alphabet(&self) -> Result<Alphabet> {
        Alphabet::new(self.alphabet_size)
    }
}

/// Mining thresholds and payout model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Window sizes scanned for contexts
    #[serde(default = "default_window_sizes")]
    pub window_sizes: Vec<usize>,
    /// Gross return of a winning 1-unit ticket
    #[serde(default = "default_payout")]
    pub payout: u32,
    /// Minimum historical triggers before a rule is considered
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: u64,
    /// Minimum global ROI in percent
    #[serde(default = "default_min_roi")]
    pub min_roi: Decimal,
    /// Minimum fraction of active years that were profitable
    #[serde(default = "default_min_stability")]
    pub min_stability: f64,
    /// Rows in the logged top-N table
    #[serde(default = "default_report_top")]
    pub report_top: usize,
    /// Aggregate window sizes on separate workers
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_window_sizes() -> Vec<usize> { vec![3, 5, 8] }
fn default_payout() -> u32 { 30 }
fn default_min_occurrences() -> u64 { 100 }
fn default_min_roi() -> Decimal { Decimal::new(15, 0) }
fn default_min_stability() -> f64 { 0.60 }
fn default_report_top() -> usize { 20 }
fn default_true() -> bool { true }

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            window_sizes: default_window_sizes(),
            payout: default_payout(),
            min_occurrences: default_min_occurrences(),
            min_roi: default_min_roi(),
            min_stability: default_min_stability(),
            report_top: default_report_top(),
            parallel: default_true(),
        }
    }
}

impl MiningConfig {
    pub fn max_window(&self) -> usize {
        self.window_sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Fixed category -> category prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRuleConfig {
    pub from: u8,
    pub to: u8,
}

/// Live matcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    /// Only rules with ROI strictly above this are deployed live
    #[serde(default = "default_live_roi_floor")]
    pub live_roi_floor: Decimal,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Recent draws kept in memory (raised to the largest rule window if smaller)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    #[serde(default = "default_chain_rules")]
    pub chain_rules: Vec<ChainRuleConfig>,
    /// JSON draw endpoint; when unset the history file is re-read each poll
    pub feed_url: Option<String>,
}

fn default_live_roi_floor() -> Decimal { Decimal::new(150, 0) }
fn default_poll_interval_secs() -> u64 { 300 }
fn default_history_depth() -> usize { 30 }
fn default_chain_rules() -> Vec<ChainRuleConfig> {
    vec![
        ChainRuleConfig { from: 31, to: 0 },  // Lapa -> Delfin
        ChainRuleConfig { from: 29, to: 6 },  // Elefante -> Rana
        ChainRuleConfig { from: 17, to: 15 }, // Pavo -> Zorro
        ChainRuleConfig { from: 3, to: 34 },  // Ciempies -> Venado
    ]
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            live_roi_floor: default_live_roi_floor(),
            poll_interval_secs: default_poll_interval_secs(),
            history_depth: default_history_depth(),
            chain_rules: default_chain_rules(),
            feed_url: None,
        }
    }
}

impl RadarConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Telegram Bot API delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
}

fn default_parse_mode() -> String { "Markdown".to_string() }
