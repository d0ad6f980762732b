//! Lotto Radar
//!
//! Mines recurring draw patterns from a lottery history and watches live
//! draws for the patterns worth betting on.
//!
//! ## Architecture
//!
//! ```text
//! CSV history → data → mining (windows → candidates → per-year tallies → gates)
//!                          ↓
//!                   ranked RuleSet → storage (JSON Lines)
//!                                        ↓
//!           DrawFeed → radar (RuleMatcher + chain rules) → Notifier
//!                                        ↑
//!                       backtest (mine on the past, replay the holdout)
//! ```

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod mining;
pub mod radar;
pub mod storage;
pub mod types;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod integration_tests;
