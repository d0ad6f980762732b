//! Rule ranking and the human-readable top-N view

use super::scorer::ScoredRule;
use serde::{Deserialize, Serialize};

/// Admitted rules ordered by ROI, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<ScoredRule>,
}

impl RuleSet {
    /// Rank rules by ROI descending. The sort is stable, so ties keep
    /// discovery order.
    pub fn ranked(mut rules: Vec<ScoredRule>) -> Self {
        rules.sort_by(|a, b| b.roi_percent.cmp(&a.roi_percent));
        Self { rules }
    }

    pub fn rules(&self) -> &[ScoredRule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<ScoredRule> {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn top(&self, n: usize) -> &[ScoredRule] {
        &self.rules[..n.min(self.rules.len())]
    }

    /// Fixed-width table of the best `n` rules
    pub fn report(&self, n: usize) -> String {
        let header = format!(
            "{:<6} | {:<20} | {:<3} | {:<5} | {:<8} | {}",
            "Win(W)", "Pattern", "Tgt", "Trig", "ROI", "Stability"
        );
        let mut out = format!("--- TOP {} STABLE PATTERNS ---\n", n);
        out.push_str(&header);
        out.push('\n');
        out.push_str(&"-".repeat(header.len()));
        out.push('\n');

        for rule in self.top(n) {
            let roi = format!("{:.1}%", rule.roi_percent);
            out.push_str(&format!(
                "{:<6} | {:<20} | {:<3} | {:<5} | {:<8} | {}\n",
                rule.window_size,
                rule.context.to_string(),
                rule.target.to_string(),
                rule.total_triggers,
                roi,
                rule.stability
            ));
        }
        out
    }
}
