//! Quoting core: reservation-price quote generation with regime switching,
//! fractional-Kelly sizing, alpha-signal blending and the risk state machine.

pub mod quoting;
pub mod risk;
pub mod signal;
pub mod sizing;
pub mod state;
pub mod types;

pub use quoting::QuoteEngine;
pub use risk::{RiskStateMachine, RiskStatus};
pub use signal::{AlphaModel, AlphaSignal};
pub use state::StrategyState;
pub use types::{MarketObservation, Quote, Regime, Side, TradeEvent};
