//! Lotto Radar
//!
//! Pattern miner and live alerting for lottery draws.

use clap::{Parser, Subcommand};
use lotto_radar::{
    backtest::run_backtest,
    config::Config,
    data::load_history,
    mining::{Miner, RuleSet},
    radar::{
        load_live_rules, ChainRules, DrawFeed, FileFeed, HttpFeed, IntervalTicker, LogNotifier,
        Notifier, Radar, RuleMatcher, TelegramNotifier,
    },
    storage::RuleStore,
};
use std::time::Instant;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "lotto-radar")]
#[command(about = "Mine lottery draw patterns and alert on live matches")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine the draw history and write the rule artifact
    Mine,
    /// Watch live draws and send alerts
    Radar {
        /// Run a single poll and exit
        #[arg(long)]
        once: bool,
    },
    /// Show the top rules from the saved artifact
    Report {
        /// Number of rules to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Mine on older draws and replay the most recent ones
    Backtest {
        /// Number of most recent draws held out for replay
        #[arg(long, default_value = "5000")]
        holdout: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Mine => mine(config).await,
        Commands::Radar { once } => radar(config, once).await,
        Commands::Report { limit } => report(config, limit).await,
        Commands::Backtest { holdout } => backtest(config, holdout).await,
    }
}

async fn mine(config: Config) -> anyhow::Result<()> {
    let started = Instant::now();
    let history = load_history(&config.data).await?;
    if history.dropped > 0 || history.duplicates > 0 {
        tracing::warn!(
            "Ingestion dropped {} invalid rows and {} duplicate draws",
            history.dropped,
            history.duplicates
        );
    }

    let top = config.mining.report_top;
    let miner = Miner::new(config.mining);
    let rule_set = miner.mine(history.events());

    let store = RuleStore::new(
        config.data.rules_file.clone(),
        config.data.alphabet()?,
        &miner.config().window_sizes,
    );
    store.save(&rule_set).await?;

    println!("{}", rule_set.report(top));
    tracing::info!(
        "Mined {} draws into {} rules in {:?}",
        history.len(),
        rule_set.len(),
        started.elapsed()
    );
    Ok(())
}

async fn radar(config: Config, once: bool) -> anyhow::Result<()> {
    tracing::info!("Starting lotto radar");
    let alphabet = config.data.alphabet()?;

    let store = RuleStore::new(
        config.data.rules_file.clone(),
        alphabet,
        &config.mining.window_sizes,
    );
    let live = load_live_rules(&store, config.radar.live_roi_floor).await;
    let rules_mtime = store.modified().await;

    let chains = ChainRules::from_config(&config.radar.chain_rules);
    let mut matcher = RuleMatcher::new(config.radar.history_depth, chains, live);

    let history = load_history(&config.data).await?;
    matcher.seed(
        history
            .tail(matcher.history().depth())
            .iter()
            .map(|e| e.category),
    );
    tracing::info!(
        "Seeded {} recent draws, {} chain rules, {} live rules",
        matcher.history().len(),
        matcher.chains().len(),
        matcher.rules().len()
    );

    let feed: Box<dyn DrawFeed> = match &config.radar.feed_url {
        Some(url) => Box::new(HttpFeed::new(url.clone(), alphabet)?),
        None => Box::new(FileFeed::new(config.data.clone())),
    };

    let notifier: Box<dyn Notifier> = match &config.telegram {
        Some(tg) => Box::new(TelegramNotifier::new(tg)),
        None => {
            tracing::warn!("Telegram not configured, alerts go to the log");
            Box::new(LogNotifier)
        }
    };

    let mut radar = Radar::new(matcher, feed, notifier)
        .with_last_seen(history.latest_timestamp())
        .with_rule_reload(store, config.radar.live_roi_floor, rules_mtime);

    if once {
        let report = radar.run_cycle().await;
        tracing::info!("Single poll: {:?}", report);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, finishing current cycle");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut ticker = IntervalTicker::new(config.radar.poll_interval());
    radar.run(&mut ticker, shutdown_rx).await;
    Ok(())
}

async fn report(config: Config, limit: usize) -> anyhow::Result<()> {
    let store = RuleStore::new(
        config.data.rules_file.clone(),
        config.data.alphabet()?,
        &config.mining.window_sizes,
    );
    let loaded = store.load().await?;
    if loaded.skipped > 0 {
        tracing::warn!("{} invalid records skipped", loaded.skipped);
    }

    let rule_set = RuleSet::ranked(loaded.rules);
    println!("{}", rule_set.report(limit));
    Ok(())
}

async fn backtest(config: Config, holdout: usize) -> anyhow::Result<()> {
    let history = load_history(&config.data).await?;
    let mining = config.mining;
    let radar = config.radar;

    let report =
        tokio::task::spawn_blocking(move || run_backtest(&history, holdout, &mining, &radar))
            .await??;
    println!("{}", report);
    Ok(())
}
