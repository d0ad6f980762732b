//! Per-year trigger and win counters
//!
//! Triggers are kept per (window, context): every time the context is
//! present in the preceding window, a bet using that context would have been
//! placed. Wins are kept per (window, context, target): the draw that
//! followed equalled the target. A win is always also a trigger, so for every
//! year `wins[(W,C,T)][y] <= triggers[(W,C)][y]`.

use super::window::{candidate_contexts, window_context};
use crate::types::{Category, Context, Event};
use std::collections::{BTreeMap, HashMap};

/// Calendar year -> count
pub type YearTally = BTreeMap<i32, u64>;

/// Sum of a tally across all years
pub fn tally_total(tally: &YearTally) -> u64 {
    tally.values().sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey {
    pub window: usize,
    pub context: Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub window: usize,
    pub context: Context,
    pub target: Category,
}

impl RuleKey {
    pub fn context_key(&self) -> ContextKey {
        ContextKey {
            window: self.window,
            context: self.context,
        }
    }
}

/// Aggregated counters for one mining run.
///
/// Rule keys are kept in discovery order so that scoring and ranking are
/// reproducible run to run.
#[derive(Debug, Clone, Default)]
pub struct RuleStats {
    triggers: HashMap<ContextKey, YearTally>,
    wins: Vec<(RuleKey, YearTally)>,
    win_index: HashMap<RuleKey, usize>,
    positions: u64,
}

impl RuleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one trigger of `context` whose following draw was `target`
    pub fn record(&mut self, window: usize, context: Context, target: Category, year: i32) {
        *self
            .triggers
            .entry(ContextKey { window, context })
            .or_default()
            .entry(year)
            .or_insert(0) += 1;

        let key = RuleKey { window, context, target };
        let idx = match self.win_index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.wins.push((key, YearTally::new()));
                self.win_index.insert(key, self.wins.len() - 1);
                self.wins.len() - 1
            }
        };
        *self.wins[idx].1.entry(year).or_insert(0) += 1;
    }

    /// Scan every position of `events` once for a single window size
    pub fn scan_window(events: &[Event], window: usize) -> Self {
        let mut stats = Self::new();
        if window == 0 {
            return stats;
        }
        for position in window..events.len() {
            let Some(set) = window_context(events, position, window) else {
                continue;
            };
            let event = &events[position];
            let year = event.year();
            for context in candidate_contexts(&set) {
                stats.record(window, context, event.category, year);
            }
            stats.positions += 1;
        }
        stats
    }

    /// Fold another run's counters in; new rule keys keep `other`'s order
    pub fn merge(&mut self, other: RuleStats) {
        for (key, tally) in other.triggers {
            let entry = self.triggers.entry(key).or_default();
            for (year, count) in tally {
                *entry.entry(year).or_insert(0) += count;
            }
        }
        for (key, tally) in other.wins {
            match self.win_index.get(&key) {
                Some(&idx) => {
                    for (year, count) in tally {
                        *self.wins[idx].1.entry(year).or_insert(0) += count;
                    }
                }
                None => {
                    self.wins.push((key, tally));
                    self.win_index.insert(key, self.wins.len() - 1);
                }
            }
        }
        self.positions += other.positions;
    }

    pub fn triggers(&self, key: &ContextKey) -> Option<&YearTally> {
        self.triggers.get(key)
    }

    pub fn wins(&self, key: &RuleKey) -> Option<&YearTally> {
        self.win_index.get(key).map(|&idx| &self.wins[idx].1)
    }

    /// Rule keys with at least one win, in discovery order
    pub fn rules(&self) -> impl Iterator<Item = (&RuleKey, &YearTally)> {
        self.wins.iter().map(|(k, t)| (k, t))
    }

    pub fn context_count(&self) -> usize {
        self.triggers.len()
    }

    pub fn rule_count(&self) -> usize {
        self.wins.len()
    }

    /// (position, window) pairs processed
    pub fn positions_scanned(&self) -> u64 {
        self.positions
    }
}
