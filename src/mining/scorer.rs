//! Profitability and stability scoring
//!
//! Fixed-odds model: every trigger stakes 1 unit on the rule's target, a win
//! returns `payout` units gross.
//!
//! ```text
//! balance = wins * payout - triggers
//! roi %   = balance / triggers * 100
//! stable  = profitable active years / active years
//! ```

use super::aggregator::{tally_total, RuleKey, RuleStats, YearTally};
use crate::config::MiningConfig;
use crate::error::{RadarError, Result};
use crate::types::{Alphabet, Category, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Admission gates for mined rules
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub payout: u32,
    pub min_occurrences: u64,
    pub min_roi: Decimal,
    pub min_stability: f64,
}

impl From<&MiningConfig> for Thresholds {
    fn from(config: &MiningConfig) -> Self {
        Self {
            payout: config.payout,
            min_occurrences: config.min_occurrences,
            min_roi: config.min_roi,
            min_stability: config.min_stability,
        }
    }
}

/// A rule that passed every admission gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRule {
    pub window_size: usize,
    pub context: Context,
    pub target: Category,
    pub total_triggers: u64,
    pub total_wins: u64,
    pub balance: i64,
    pub roi_percent: Decimal,
    pub years_active: u32,
    pub years_profitable: u32,
    pub stability_ratio: f64,
    /// "profitable/active (pct%)"
    pub stability: String,
}

impl ScoredRule {
    /// Structural checks applied to records read back from disk.
    /// `window_sizes` are the sizes the miner is configured to produce.
    pub fn validate(&self, alphabet: &Alphabet, window_sizes: &[usize]) -> Result<()> {
        if self.window_size < Context::MIN_LEN {
            return Err(RadarError::InvalidRule(format!(
                "window size {} too small",
                self.window_size
            )));
        }
        if !window_sizes.contains(&self.window_size) {
            return Err(RadarError::InvalidRule(format!(
                "window size {} not among configured sizes {:?}",
                self.window_size, window_sizes
            )));
        }
        if let Some(c) = self.context.as_slice().iter().find(|c| !alphabet.contains(**c)) {
            return Err(RadarError::InvalidRule(format!("context category {} outside alphabet", c)));
        }
        if !alphabet.contains(self.target) {
            return Err(RadarError::InvalidRule(format!(
                "target {} outside alphabet",
                self.target
            )));
        }
        if self.context.len() > self.window_size {
            return Err(RadarError::InvalidRule(format!(
                "context {} cannot fit window {}",
                self.context, self.window_size
            )));
        }
        if self.total_wins > self.total_triggers {
            return Err(RadarError::InvalidRule(format!(
                "{} wins exceed {} triggers",
                self.total_wins, self.total_triggers
            )));
        }
        Ok(())
    }
}

/// Net units after `triggers` one-unit bets of which `wins` paid `payout`
pub fn balance(wins: u64, triggers: u64, payout: u32) -> i64 {
    wins as i64 * payout as i64 - triggers as i64
}

/// Balance over stake, in percent. Zero stake yields zero.
pub fn roi_percent(balance: i64, triggers: u64) -> Decimal {
    if triggers == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(balance) * Decimal::ONE_HUNDRED / Decimal::from(triggers)
}

/// Year-over-year consistency of a rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stability {
    pub years_active: u32,
    pub years_profitable: u32,
    pub ratio: f64,
}

impl Stability {
    pub fn display(&self) -> String {
        format!(
            "{}/{} ({:.0}%)",
            self.years_profitable,
            self.years_active,
            self.ratio * 100.0
        )
    }
}

/// Count active years (any trigger) and the ones that ended net positive
pub fn stability(triggers: &YearTally, wins: &YearTally, payout: u32) -> Stability {
    let mut years_active = 0;
    let mut years_profitable = 0;

    for (year, &t) in triggers {
        if t == 0 {
            continue;
        }
        years_active += 1;
        let w = wins.get(year).copied().unwrap_or(0);
        if balance(w, t, payout) > 0 {
            years_profitable += 1;
        }
    }

    let ratio = if years_active > 0 {
        years_profitable as f64 / years_active as f64
    } else {
        0.0
    };

    Stability {
        years_active,
        years_profitable,
        ratio,
    }
}

/// Outcome of running a single rule through the gates
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Admitted(ScoredRule),
    LowVolume,
    LowRoi,
    Unstable,
}

/// Score one rule key. Gates run cheapest first: volume, ROI, stability.
pub fn score_rule(key: &RuleKey, triggers: &YearTally, wins: &YearTally, th: &Thresholds) -> Verdict {
    let total_triggers = tally_total(triggers);
    if total_triggers < th.min_occurrences {
        return Verdict::LowVolume;
    }

    let total_wins = tally_total(wins);
    let net = balance(total_wins, total_triggers, th.payout);
    let roi = roi_percent(net, total_triggers);
    if roi < th.min_roi {
        return Verdict::LowRoi;
    }

    let stab = stability(triggers, wins, th.payout);
    if stab.ratio < th.min_stability {
        return Verdict::Unstable;
    }

    Verdict::Admitted(ScoredRule {
        window_size: key.window,
        context: key.context,
        target: key.target,
        total_triggers,
        total_wins,
        balance: net,
        roi_percent: roi,
        years_active: stab.years_active,
        years_profitable: stab.years_profitable,
        stability_ratio: stab.ratio,
        stability: stab.display(),
    })
}

/// Admitted rules (discovery order) and per-gate rejection counts
#[derive(Debug, Clone, Default)]
pub struct ScoringSummary {
    pub admitted: Vec<ScoredRule>,
    pub low_volume: usize,
    pub low_roi: usize,
    pub unstable: usize,
}

/// Score every rule key that won at least once
pub fn score_all(stats: &RuleStats, th: &Thresholds) -> ScoringSummary {
    let mut summary = ScoringSummary::default();
    let empty = YearTally::new();

    for (key, wins) in stats.rules() {
        let triggers = stats.triggers(&key.context_key()).unwrap_or(&empty);
        match score_rule(key, triggers, wins, th) {
            Verdict::Admitted(rule) => summary.admitted.push(rule),
            Verdict::LowVolume => summary.low_volume += 1,
            Verdict::LowRoi => summary.low_roi += 1,
            Verdict::Unstable => summary.unstable += 1,
        }
    }

    tracing::info!(
        "Scored {} rules: {} admitted, {} low volume, {} low ROI, {} unstable",
        stats.rule_count(),
        summary.admitted.len(),
        summary.low_volume,
        summary.low_roi,
        summary.unstable
    );
    summary
}
