//! Replays a CSV candle dump through the quoting engine with the
//! candle-range fill rule and prints the final scorecard.
//!
//! Usage: `backtest <candles.csv> [config.toml]`

use anyhow::{Context, Result};
use stoikov_mm::{
    parse_csv, AlphaSignal, DriftForecast, ExecutionSimulator, SimulationDriver, StrategyConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let data_path = args
        .next()
        .context("usage: backtest <candles.csv> [config.toml]")?;
    let cfg = match args.next() {
        Some(path) => StrategyConfig::from_file(path)?,
        None => StrategyConfig::default(),
    };

    let text = std::fs::read_to_string(&data_path)
        .with_context(|| format!("Failed to read {data_path}"))?;
    let observations = parse_csv(&text)?;
    tracing::info!(observations = observations.len(), "feed loaded");

    let alpha = AlphaSignal::new(Box::new(DriftForecast::default()), cfg.alpha_weight);
    let driver = SimulationDriver::new(cfg, alpha, ExecutionSimulator::ohlc());
    let outcome = driver.run(observations)?;

    tracing::info!(steps = outcome.steps, stopped = outcome.stopped, "backtest complete");
    match outcome.report {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => tracing::warn!("no metrics available: run was shorter than two steps"),
    }
    Ok(())
}
