use serde::Serialize;

/// Trade direction from the strategy's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Two-sided quote with a shared order quantity. A side priced at exactly
/// `0.0` is suppressed for the step, which is distinct from any valid price.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
    pub quantity: f64,
}

impl Quote {
    /// The quote emitted for every step after the risk machine has stopped.
    pub fn halt() -> Self {
        Self::default()
    }

    pub fn is_halt(&self) -> bool {
        self.bid == 0.0 && self.ask == 0.0 && self.quantity == 0.0
    }

    pub fn has_bid(&self) -> bool {
        self.bid > 0.0
    }

    pub fn has_ask(&self) -> bool {
        self.ask > 0.0
    }
}

/// One market observation per simulation step, immutable once consumed.
#[derive(Clone, Copy, Debug)]
pub struct MarketObservation {
    pub mid: f64,
    pub high: f64,
    pub low: f64,
    pub bid_liquidity: f64,
    pub ask_liquidity: f64,
}

impl MarketObservation {
    /// Observation with no intra-step range, used for synthetic paths and
    /// tests where fills should never trigger on the OHLC rule.
    pub fn flat(mid: f64) -> Self {
        Self {
            mid,
            high: mid,
            low: mid,
            bid_liquidity: 1.0,
            ask_liquidity: 1.0,
        }
    }
}

/// Fill produced by the execution simulator; consumed by the state update
/// within the same step and never persisted.
#[derive(Clone, Copy, Debug)]
pub struct TradeEvent {
    pub side: Side,
    pub price: f64,
    pub quantity: f64,
}

/// Quoting regime selected from trend strength. The bands are mutually
/// exclusive and evaluated top to bottom; the first matching band wins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Regime {
    /// Vertical rally: the ask is withdrawn entirely and the bid retreats.
    ShieldUp,
    /// Moderate uptrend: extreme ask skew discourages selling into the move.
    ModerateUp { reservation: f64 },
    /// Downtrend: bid skew protects against catching the falling price.
    DownProtect { reservation: f64 },
    /// Default regime: inventory-skewed reservation price around the mid.
    MeanReverting { reservation: f64 },
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShieldUp => "shield_up",
            Self::ModerateUp { .. } => "moderate_up",
            Self::DownProtect { .. } => "down_protect",
            Self::MeanReverting { .. } => "mean_reverting",
        }
    }

    /// `(bid_bias, ask_bias)` half-spread multipliers for the regime.
    pub fn biases(&self) -> (f64, f64) {
        match self {
            Self::ShieldUp => (1.0, 1.0),
            Self::ModerateUp { .. } => (0.2, 15.0),
            Self::DownProtect { .. } => (10.0, 0.5),
            Self::MeanReverting { .. } => (1.0, 1.0),
        }
    }

    pub fn reservation(&self) -> Option<f64> {
        match self {
            Self::ShieldUp => None,
            Self::ModerateUp { reservation }
            | Self::DownProtect { reservation }
            | Self::MeanReverting { reservation } => Some(*reservation),
        }
    }
}

/// Per-step telemetry record emitted by the simulation driver.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub mid: f64,
    pub bid: f64,
    pub ask: f64,
    pub inventory: f64,
    pub pnl: f64,
}

/// Final scorecard computed from the accumulated P&L series.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PerformanceReport {
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
}
