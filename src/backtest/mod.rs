//! Retrospective backtest
//!
//! Mines rules on everything except the last N draws, then replays those
//! N draws through a live matcher warmed with the preceding history. Every
//! alert emitted after a draw is a one-unit bet on the following draw.


use crate::config::{MiningConfig, RadarConfig};
use crate::data::DrawHistory;
use crate::error::{RadarError, Result};
use crate::mining::scorer::{balance, roi_percent};
use crate::mining::Miner;
use crate::radar::{deploy, Alert, ChainRules, RuleMatcher};
use crate::types::Event;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Bets and outcomes for one kind of alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub bets: u64,
    pub wins: u64,
}

impl Ledger {
    fn settle(&mut self, won: bool) {
        self.bets += 1;
        if won {
            self.wins += 1;
        }
    }

    pub fn balance(&self, payout: u32) -> i64 {
        balance(self.wins, self.bets, payout)
    }

    pub fn roi_percent(&self, payout: u32) -> Decimal {
        roi_percent(self.balance(payout), self.bets)
    }

    fn combined(self, other: Ledger) -> Ledger {
        Ledger {
            bets: self.bets + other.bets,
            wins: self.wins + other.wins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub payout: u32,
    /// Held-out draws replayed
    pub replayed: usize,
    /// Mined rules above the live floor
    pub rules_deployed: usize,
    pub chain: Ledger,
    pub learned: Ledger,
}

impl BacktestReport {
    pub fn total(&self) -> Ledger {
        self.chain.combined(self.learned)
    }
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- BACKTEST: {} draws, {} rules deployed ---",
            self.replayed, self.rules_deployed
        )?;
        writeln!(f, "{:<8} {:>6} {:>6} {:>8} {:>8}", "Kind", "Bets", "Wins", "Balance", "ROI")?;
        for (name, ledger) in [("chain", self.chain), ("learned", self.learned), ("total", self.total())] {
            writeln!(
                f,
                "{:<8} {:>6} {:>6} {:>8} {:>7.1}%",
                name,
                ledger.bets,
                ledger.wins,
                ledger.balance(self.payout),
                ledger.roi_percent(self.payout)
            )?;
        }
        Ok(())
    }
}

/// Replay `holdout` through `matcher`, settling each alert on the next draw.
/// Alerts raised by the final draw have nothing to settle against.
pub fn replay(matcher: &mut RuleMatcher, holdout: &[Event], payout: u32) -> BacktestReport {
    let mut report = BacktestReport {
        payout,
        replayed: holdout.len(),
        rules_deployed: matcher.rules().len(),
        chain: Ledger::default(),
        learned: Ledger::default(),
    };

    let mut pending: Vec<Alert> = Vec::new();
    for event in holdout {
        for alert in pending.drain(..) {
            let won = alert.target() == event.category;
            if alert.is_chain() {
                report.chain.settle(won);
            } else {
                report.learned.settle(won);
            }
        }
        pending = matcher.observe(event.category);
    }
    report
}

/// Mine on the training part of `history` and replay the last `holdout` draws
pub fn run_backtest(
    history: &DrawHistory,
    holdout: usize,
    mining: &MiningConfig,
    radar: &RadarConfig,
) -> Result<BacktestReport> {
    if holdout == 0 || holdout >= history.len() {
        return Err(RadarError::Data(format!(
            "holdout {} must be between 1 and {} draws",
            holdout,
            history.len().saturating_sub(1)
        )));
    }

    let (training, held_out) = history.split_holdout(holdout);
    info!(
        "Backtest: mining {} draws, replaying {}",
        training.len(),
        held_out.len()
    );

    let rule_set = Miner::new(mining.clone()).mine(training);
    let live = deploy(rule_set.rules(), radar.live_roi_floor);

    let mut matcher = RuleMatcher::new(
        radar.history_depth,
        ChainRules::from_config(&radar.chain_rules),
        live,
    );
    let depth = matcher.history().depth();
    let warmup = &training[training.len().saturating_sub(depth)..];
    matcher.seed(warmup.iter().map(|e| e.category));

    let report = replay(&mut matcher, held_out, mining.payout);
    info!(
        "Backtest finished: {} bets, {} wins, ROI {:.1}%",
        report.total().bets,
        report.total().wins,
        report.total().roi_percent(mining.payout)
    );
    Ok(report)
}
