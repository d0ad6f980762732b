//! Pattern mining
//!
//! ```text
//! draws → window contexts → pair/triplet candidates → per-year counters
//!       → ROI + stability gates → ranked RuleSet
//! ```
//!
//! Each window size is aggregated independently; with `parallel` enabled the
//! window sizes run on rayon workers and are merged back in configured order,
//! which yields the same RuleSet as a sequential run.

pub mod aggregator;
pub mod ranking;
pub mod scorer;
pub mod window;


pub use aggregator::{ContextKey, RuleKey, RuleStats, YearTally};
pub use ranking::RuleSet;
pub use scorer::{ScoredRule, ScoringSummary, Stability, Thresholds, Verdict};

use crate::config::MiningConfig;
use crate::types::Event;
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::info;

/// Batch miner over a fully materialized draw sequence
pub struct Miner {
    config: MiningConfig,
}

impl Miner {
    /// Repeated window sizes are collapsed so each is scanned once
    pub fn new(mut config: MiningConfig) -> Self {
        let mut seen = HashSet::new();
        config.window_sizes.retain(|w| seen.insert(*w));
        Self { config }
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Count triggers and wins for every configured window size
    pub fn aggregate(&self, events: &[Event]) -> RuleStats {
        let per_window: Vec<RuleStats> = if self.config.parallel {
            self.config
                .window_sizes
                .par_iter()
                .map(|&w| Self::scan(events, w))
                .collect()
        } else {
            self.config
                .window_sizes
                .iter()
                .map(|&w| Self::scan(events, w))
                .collect()
        };

        let mut stats = RuleStats::new();
        for window_stats in per_window {
            stats.merge(window_stats);
        }
        stats
    }

    fn scan(events: &[Event], window: usize) -> RuleStats {
        let started = Instant::now();
        let stats = RuleStats::scan_window(events, window);
        info!(
            "Window {}: {} positions, {} contexts, {} rules ({:?})",
            window,
            stats.positions_scanned(),
            stats.context_count(),
            stats.rule_count(),
            started.elapsed()
        );
        stats
    }

    /// Score aggregated counters against the configured gates
    pub fn score(&self, stats: &RuleStats) -> ScoringSummary {
        scorer::score_all(stats, &Thresholds::from(&self.config))
    }

    /// Full pipeline: aggregate, score, rank
    pub fn mine(&self, events: &[Event]) -> RuleSet {
        info!(
            "Scanning {} draws across windows {:?} for pairs and triplets",
            events.len(),
            self.config.window_sizes
        );
        let stats = self.aggregate(events);
        let summary = self.score(&stats);
        let rule_set = RuleSet::ranked(summary.admitted);
        info!("Mining complete: {} rules admitted", rule_set.len());
        rule_set
    }
}
