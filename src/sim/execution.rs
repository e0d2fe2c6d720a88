use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::strategy::types::{MarketObservation, Quote, Side, TradeEvent};

/// Inventory below this magnitude counts as flat.
pub const FLAT_TOLERANCE: f64 = 1e-4;

const STOCHASTIC_BID_PROB: f64 = 0.35;
const STOCHASTIC_ASK_PROB: f64 = 0.35;

enum FillMode {
    /// Candle-range rule: the bid fills when the step's low trades through
    /// it, the ask when the high does. Bid checked first; one fill per step.
    Ohlc,
    /// Uniform draw partitioned into fixed bid / ask / no-fill bands.
    Stochastic {
        bid_prob: f64,
        ask_prob: f64,
        rng: StdRng,
    },
}

/// Decides whether a quote fills against a market observation. Suppressed
/// sides (price exactly `0.0`) never fill under either rule.
pub struct ExecutionSimulator {
    mode: FillMode,
}

impl ExecutionSimulator {
    pub fn ohlc() -> Self {
        Self {
            mode: FillMode::Ohlc,
        }
    }

    pub fn stochastic(seed: u64) -> Self {
        Self::stochastic_with_bands(seed, STOCHASTIC_BID_PROB, STOCHASTIC_ASK_PROB)
    }

    pub fn stochastic_with_bands(seed: u64, bid_prob: f64, ask_prob: f64) -> Self {
        Self {
            mode: FillMode::Stochastic {
                bid_prob,
                ask_prob,
                rng: StdRng::seed_from_u64(seed),
            },
        }
    }

    pub fn match_quote(&mut self, quote: &Quote, obs: &MarketObservation) -> Option<TradeEvent> {
        match &mut self.mode {
            FillMode::Ohlc => {
                if quote.has_bid() && obs.low <= quote.bid {
                    Some(TradeEvent {
                        side: Side::Buy,
                        price: quote.bid,
                        quantity: quote.quantity,
                    })
                } else if quote.has_ask() && obs.high >= quote.ask {
                    Some(TradeEvent {
                        side: Side::Sell,
                        price: quote.ask,
                        quantity: quote.quantity,
                    })
                } else {
                    None
                }
            }
            FillMode::Stochastic {
                bid_prob,
                ask_prob,
                rng,
            } => {
                let draw: f64 = rng.gen();
                if draw < *bid_prob && quote.has_bid() {
                    Some(TradeEvent {
                        side: Side::Buy,
                        price: quote.bid,
                        quantity: quote.quantity,
                    })
                } else if draw < *bid_prob + *ask_prob && quote.has_ask() {
                    Some(TradeEvent {
                        side: Side::Sell,
                        price: quote.ask,
                        quantity: quote.quantity,
                    })
                } else {
                    None
                }
            }
        }
    }
}

/// Synthetic post-halt trade flattening the remaining inventory at the
/// current mid, opposite side from the inventory sign. `None` when already
/// flat within tolerance.
pub fn liquidation_trade(inventory: f64, mid: f64) -> Option<TradeEvent> {
    if inventory.abs() <= FLAT_TOLERANCE {
        return None;
    }
    let side = if inventory > 0.0 {
        Side::Sell
    } else {
        Side::Buy
    };
    Some(TradeEvent {
        side,
        price: mid,
        quantity: inventory.abs(),
    })
}
