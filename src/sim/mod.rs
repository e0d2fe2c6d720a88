//! Simulation harness: fill models, incremental performance metrics,
//! observation feeds and the sequential per-step driver.

pub mod driver;
pub mod execution;
pub mod feed;
pub mod metrics;

pub use driver::{BacktestReport, SimulationDriver};
pub use execution::{liquidation_trade, ExecutionSimulator, FLAT_TOLERANCE};
pub use metrics::MetricsAccumulator;
