//! Market-making decision engine for a single instrument.
//!
//! The `strategy` module holds the quoting core: a reservation-price model
//! with regime switching, fractional-Kelly position sizing, a pluggable alpha
//! signal and a stop-loss/profit-lock risk state machine. The `sim` module
//! drives that core over a sequence of market observations, simulating fills
//! with slippage and commission and accumulating performance statistics.

pub mod config;
pub mod errors;
pub mod sim;
pub mod strategy;

pub use config::StrategyConfig;
pub use errors::{EngineError, Result};
pub use sim::driver::{BacktestReport, SimulationDriver};
pub use sim::execution::{liquidation_trade, ExecutionSimulator, FLAT_TOLERANCE};
pub use sim::feed::{gbm_path, parse_csv, RawCandle};
pub use sim::metrics::MetricsAccumulator;
pub use strategy::quoting::QuoteEngine;
pub use strategy::risk::{RiskStateMachine, RiskStatus};
pub use strategy::signal::{AlphaModel, AlphaSignal, DriftForecast, FlatForecast};
pub use strategy::sizing::{kelly_quantity, MIN_ORDER_QTY};
pub use strategy::state::{PriceHistory, StrategyState};
pub use strategy::types::{
    MarketObservation, PerformanceReport, Quote, Regime, Side, StepRecord, TradeEvent,
};
