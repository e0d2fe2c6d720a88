//! Stochastic session: a synthetic Brownian price path matched with the
//! probability-band fill model. Reproducible per seed.
//!
//! Usage: `simulate [steps] [seed] [config.toml]`

use anyhow::{Context, Result};
use stoikov_mm::{
    gbm_path, AlphaSignal, DriftForecast, ExecutionSimulator, SimulationDriver, StrategyConfig,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_STEPS: usize = 10_000;
const DEFAULT_SEED: u64 = 7;
const START_PRICE: f64 = 100.0;
const PATH_SIGMA: f64 = 0.05;
const PATH_DRIFT: f64 = 0.002;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let steps = match args.next() {
        Some(v) => v.parse::<usize>().context("steps must be an integer")?,
        None => DEFAULT_STEPS,
    };
    let seed = match args.next() {
        Some(v) => v.parse::<u64>().context("seed must be an integer")?,
        None => DEFAULT_SEED,
    };
    let cfg = match args.next() {
        Some(path) => StrategyConfig::from_file(path)?,
        None => StrategyConfig::default(),
    };

    tracing::info!(steps, seed, "stochastic session starting");
    let path = gbm_path(steps, START_PRICE, PATH_SIGMA, PATH_DRIFT, seed)?;

    let alpha = AlphaSignal::new(Box::new(DriftForecast::default()), cfg.alpha_weight);
    let driver = SimulationDriver::new(cfg, alpha, ExecutionSimulator::stochastic(seed));
    let outcome = driver.run(path)?;

    if outcome.stopped {
        tracing::warn!(steps = outcome.steps, "risk lock engaged before the path ran out");
    }
    match outcome.report {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => tracing::warn!("no metrics available: run was shorter than two steps"),
    }
    Ok(())
}
