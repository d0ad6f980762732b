//! Live radar
//!
//! Polls a draw feed on a schedule, feeds every new draw through the
//! `RuleMatcher` and pushes the resulting alerts to a `Notifier`.
//!
//! ```text
//!   Ticker ──tick──▶ run_cycle ──fetch──▶ DrawFeed
//!                        │
//!                        ├─ reload rules if the artifact changed
//!                        ├─ observe each new draw (oldest first)
//!                        └─ send alerts ──▶ Notifier
//! ```
//!
//! Cancellation is only checked between cycles; a cycle in flight always
//! completes.

pub mod feed;
pub mod matcher;
pub mod notify;
pub mod schedule;


pub use feed::{DrawFeed, FileFeed, HttpFeed};
pub use matcher::{
    dedup_alerts, deploy, Alert, AlertKey, ChainRules, LiveRule, RecentHistory, RuleMatcher,
};
pub use notify::{LogNotifier, Notifier, TelegramNotifier};
pub use schedule::{ChannelTicker, IntervalTicker, Ticker};

use crate::storage::RuleStore;
use crate::types::Event;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::time::SystemTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Outcome of a single poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub new_events: usize,
    pub alerts: usize,
    pub failed_deliveries: usize,
}

impl CycleReport {
    fn absorb(&mut self, other: CycleReport) {
        self.new_events += other.new_events;
        self.alerts += other.alerts;
        self.failed_deliveries += other.failed_deliveries;
    }
}

/// Load the rule artifact and keep the rules worth alerting on.
/// A missing or unreadable artifact yields no rules.
pub async fn load_live_rules(store: &RuleStore, roi_floor: Decimal) -> Vec<LiveRule> {
    match store.load().await {
        Ok(loaded) => {
            let live = deploy(&loaded.rules, roi_floor);
            info!(
                "Loaded {} rules ({} skipped), {} above ROI floor {}%",
                loaded.rules.len(),
                loaded.skipped,
                live.len(),
                roi_floor
            );
            live
        }
        Err(e) => {
            warn!("No rules loaded from {}: {}", store.path().display(), e);
            Vec::new()
        }
    }
}

struct RuleReload {
    store: RuleStore,
    roi_floor: Decimal,
    seen: Option<SystemTime>,
}

pub struct Radar {
    matcher: RuleMatcher,
    feed: Box<dyn DrawFeed>,
    notifier: Box<dyn Notifier>,
    last_seen: Option<NaiveDateTime>,
    reload: Option<RuleReload>,
}

impl Radar {
    pub fn new(matcher: RuleMatcher, feed: Box<dyn DrawFeed>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            matcher,
            feed,
            notifier,
            last_seen: None,
            reload: None,
        }
    }

    /// Events at or before `timestamp` are treated as already processed
    pub fn with_last_seen(mut self, timestamp: Option<NaiveDateTime>) -> Self {
        self.last_seen = timestamp;
        self
    }

    /// Reload deployed rules whenever the artifact's mtime moves past `seen`
    pub fn with_rule_reload(
        mut self,
        store: RuleStore,
        roi_floor: Decimal,
        seen: Option<SystemTime>,
    ) -> Self {
        self.reload = Some(RuleReload {
            store,
            roi_floor,
            seen,
        });
        self
    }

    pub fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }

    pub fn last_seen(&self) -> Option<NaiveDateTime> {
        self.last_seen
    }

    /// Poll once: process every draw newer than the last one seen
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        self.reload_rules_if_changed().await;

        let batch = match self.feed.fetch().await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Draw feed unavailable: {}", e);
                return report;
            }
        };

        let last_seen = self.last_seen;
        let mut fresh: Vec<Event> = batch
            .into_iter()
            .filter(|e| last_seen.map_or(true, |ts| e.timestamp > ts))
            .collect();
        fresh.sort_by_key(|e| e.timestamp);
        fresh.dedup_by_key(|e| e.timestamp);

        if fresh.is_empty() {
            debug!("No new draws");
            return report;
        }

        for event in fresh {
            info!("New draw {} -> {}", event.timestamp, event.category.label());
            let alerts = self.matcher.observe(event.category);
            report.alerts += alerts.len();
            report.failed_deliveries += self.dispatch(&alerts).await;
            self.last_seen = Some(event.timestamp);
            report.new_events += 1;
        }

        info!(
            "Cycle: {} new draws, {} alerts, {} failed deliveries",
            report.new_events, report.alerts, report.failed_deliveries
        );
        report
    }

    /// Run cycles on every tick until shutdown is signalled or the ticker ends
    pub async fn run<T: Ticker + ?Sized>(
        &mut self,
        ticker: &mut T,
        mut shutdown: watch::Receiver<bool>,
    ) -> CycleReport {
        let mut totals = CycleReport::default();
        let mut cycles = 0u64;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                ticked = ticker.tick() => {
                    if !ticked {
                        break;
                    }
                }
            }
            totals.absorb(self.run_cycle().await);
            cycles += 1;
        }

        info!(
            "Radar stopped after {} cycles ({} draws, {} alerts)",
            cycles, totals.new_events, totals.alerts
        );
        totals
    }

    async fn dispatch(&self, alerts: &[Alert]) -> usize {
        let mut failures = 0;
        for alert in alerts {
            if let Err(e) = self.notifier.send(&alert.message()).await {
                warn!("Alert delivery failed: {}", e);
                failures += 1;
            }
        }
        failures
    }

    async fn reload_rules_if_changed(&mut self) {
        let Some(reload) = self.reload.as_mut() else {
            return;
        };
        let modified = reload.store.modified().await;
        if modified.is_none() || modified == reload.seen {
            return;
        }
        match reload.store.load().await {
            Ok(loaded) => {
                let live = deploy(&loaded.rules, reload.roi_floor);
                info!("Rule artifact changed, {} live rules deployed", live.len());
                reload.seen = modified;
                self.matcher.replace_rules(live);
            }
            Err(e) => warn!("Rule reload failed: {}", e),
        }
    }
}
