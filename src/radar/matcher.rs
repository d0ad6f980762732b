//! Live rule matching
//!
//! Every new draw is appended to a bounded history, then chain rules and
//! mined rules are re-evaluated from scratch. There is no memory of earlier
//! alerts: a context that stays inside the window keeps alerting each draw.

use crate::config::ChainRuleConfig;
use crate::mining::window::distinct_categories;
use crate::mining::ScoredRule;
use crate::types::{Category, Context};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// The most recent draws, oldest first
#[derive(Debug, Clone)]
pub struct RecentHistory {
    items: VecDeque<Category>,
    depth: usize,
}

impl RecentHistory {
    pub fn new(depth: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(depth + 1),
            depth,
        }
    }

    /// Append a draw, evicting the oldest beyond `depth`
    pub fn push(&mut self, category: Category) {
        self.items.push_back(category);
        while self.items.len() > self.depth {
            self.items.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn grow(&mut self, depth: usize) {
        self.depth = self.depth.max(depth);
    }

    pub fn latest(&self) -> Option<Category> {
        self.items.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.items.iter()
    }

    /// Distinct categories of the last `window` draws, if that many exist
    pub fn window_set(&self, window: usize) -> Option<Vec<Category>> {
        if window == 0 || self.items.len() < window {
            return None;
        }
        let skip = self.items.len() - window;
        Some(distinct_categories(self.items.iter().skip(skip).copied()))
    }
}

/// Fixed category -> category predictions, independent of mined rules
#[derive(Debug, Clone, Default)]
pub struct ChainRules {
    map: BTreeMap<Category, Category>,
}

impl ChainRules {
    pub fn new(pairs: impl IntoIterator<Item = (Category, Category)>) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    pub fn from_config(rules: &[ChainRuleConfig]) -> Self {
        Self::new(
            rules
                .iter()
                .map(|r| (Category::new(r.from), Category::new(r.to))),
        )
    }

    pub fn predict(&self, category: Category) -> Option<Category> {
        self.map.get(&category).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// A mined rule deployed for live matching
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRule {
    pub window_size: usize,
    pub context: Context,
    pub target: Category,
    pub roi_percent: Decimal,
    pub stability: String,
}

impl From<&ScoredRule> for LiveRule {
    fn from(rule: &ScoredRule) -> Self {
        Self {
            window_size: rule.window_size,
            context: rule.context,
            target: rule.target,
            roi_percent: rule.roi_percent,
            stability: rule.stability.clone(),
        }
    }
}

/// Keep only rules with ROI strictly above the live floor
pub fn deploy(rules: &[ScoredRule], roi_floor: Decimal) -> Vec<LiveRule> {
    rules
        .iter()
        .filter(|r| r.roi_percent > roi_floor)
        .map(LiveRule::from)
        .collect()
}

/// Recommendation to bet on a category in the upcoming draw
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Chain {
        trigger: Category,
        predicted: Category,
    },
    Pattern {
        window_size: usize,
        context: Context,
        target: Category,
        roi_percent: Decimal,
        stability: String,
    },
}

/// Identity used to collapse duplicate alerts within one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKey {
    Chain(Category, Category),
    Pattern(Context, Category),
}

impl Alert {
    /// Category recommended for the next draw
    pub fn target(&self) -> Category {
        match self {
            Alert::Chain { predicted, .. } => *predicted,
            Alert::Pattern { target, .. } => *target,
        }
    }

    pub fn key(&self) -> AlertKey {
        match self {
            Alert::Chain { trigger, predicted } => AlertKey::Chain(*trigger, *predicted),
            Alert::Pattern { context, target, .. } => AlertKey::Pattern(*context, *target),
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, Alert::Chain { .. })
    }

    /// Markdown text for the notification channel
    pub fn message(&self) -> String {
        match self {
            Alert::Chain { trigger, predicted } => format!(
                "⛓ *Chain Rule*\n\n\
                Last draw: `{}`\n\
                Play next: `{}`\n\
                Confidence: high",
                trigger.label(),
                predicted.label()
            ),
            Alert::Pattern {
                window_size,
                context,
                target,
                roi_percent,
                stability,
            } => format!(
                "🎯 *Pattern Alert* (last {} draws)\n\n\
                Context: `{}`\n\
                Play next: `{}`\n\
                ROI: {:.1}% | Stability: {}",
                window_size,
                context.labels(),
                target.label(),
                roi_percent,
                stability
            ),
        }
    }
}

/// Drop repeated alerts, keeping the first occurrence of each key
pub fn dedup_alerts(alerts: Vec<Alert>) -> Vec<Alert> {
    let mut seen = HashSet::new();
    alerts.into_iter().filter(|a| seen.insert(a.key())).collect()
}

/// Live matcher state: recent draws plus the deployed rules
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    history: RecentHistory,
    chains: ChainRules,
    rules: Vec<LiveRule>,
}

impl RuleMatcher {
    /// History depth is raised to the largest rule window when needed
    pub fn new(history_depth: usize, chains: ChainRules, rules: Vec<LiveRule>) -> Self {
        let depth = rules
            .iter()
            .map(|r| r.window_size)
            .max()
            .unwrap_or(0)
            .max(history_depth);
        Self {
            history: RecentHistory::new(depth),
            chains,
            rules,
        }
    }

    /// Pre-load history without evaluating
    pub fn seed(&mut self, categories: impl IntoIterator<Item = Category>) {
        for c in categories {
            self.history.push(c);
        }
    }

    /// Swap in a freshly mined rule set
    pub fn replace_rules(&mut self, rules: Vec<LiveRule>) {
        if let Some(max) = rules.iter().map(|r| r.window_size).max() {
            self.history.grow(max);
        }
        self.rules = rules;
    }

    pub fn rules(&self) -> &[LiveRule] {
        &self.rules
    }

    pub fn chains(&self) -> &ChainRules {
        &self.chains
    }

    pub fn history(&self) -> &RecentHistory {
        &self.history
    }

    /// Record a new draw and return the alerts for the next one
    pub fn observe(&mut self, category: Category) -> Vec<Alert> {
        self.history.push(category);
        self.evaluate()
    }

    /// Evaluate chain and mined rules against the current history
    pub fn evaluate(&self) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(latest) = self.history.latest() {
            if let Some(predicted) = self.chains.predict(latest) {
                alerts.push(Alert::Chain {
                    trigger: latest,
                    predicted,
                });
            }
        }

        // Window sets are shared across rules with the same window size
        let mut window_sets: BTreeMap<usize, Option<Vec<Category>>> = BTreeMap::new();
        for rule in &self.rules {
            let set = window_sets
                .entry(rule.window_size)
                .or_insert_with(|| self.history.window_set(rule.window_size));
            let Some(set) = set.as_deref() else {
                continue;
            };
            if rule.context.is_contained_in(set) {
                alerts.push(Alert::Pattern {
                    window_size: rule.window_size,
                    context: rule.context,
                    target: rule.target,
                    roi_percent: rule.roi_percent,
                    stability: rule.stability.clone(),
                });
            }
        }

        dedup_alerts(alerts)
    }
}
