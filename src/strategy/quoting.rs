use statrs::statistics::Statistics;

use super::signal::AlphaSignal;
use super::sizing::kelly_quantity;
use super::state::StrategyState;
use super::types::{MarketObservation, Quote, Regime};
use crate::config::StrategyConfig;
use crate::errors::{EngineError, Result};

/// Samples used for the realized-volatility estimate.
pub const VOL_WINDOW: usize = 30;

const VOL_BASELINE: f64 = 0.0002;
const VOL_MULTIPLIER_MAX: f64 = 6.0;
const MODERATE_TREND_BAND: f64 = 0.0005;
const INVENTORY_CAP_RATIO: f64 = 0.95;
const MODERATE_SKEW_RATE: f64 = 0.002;
const MEAN_REVERT_ALPHA_BLEND: f64 = 0.8;
const DYNAMIC_GAMMA_MAX: f64 = 50.0;

/// Two-sided quote generator: reservation-price model with trend-selected
/// regimes, volatility-scaled spreads and inventory caps.
pub struct QuoteEngine {
    cfg: StrategyConfig,
    alpha: AlphaSignal,
}

impl QuoteEngine {
    pub fn new(cfg: StrategyConfig, alpha: AlphaSignal) -> Self {
        Self { cfg, alpha }
    }

    /// Produces the quote for one step. When the state is already stopped
    /// this returns the halt quote without touching the price history, so a
    /// halted engine observes nothing.
    pub fn quotes(&self, state: &mut StrategyState, obs: &MarketObservation) -> Result<Quote> {
        let mid = obs.mid;
        if !mid.is_finite() || mid <= 0.0 {
            return Err(EngineError::invalid_input(format!(
                "quote generation requires a positive mid price, got {mid}"
            )));
        }
        if state.is_stopped() {
            return Ok(Quote::halt());
        }

        state.history.push(mid);

        let order_qty = kelly_quantity(
            self.cfg.win_rate,
            self.cfg.profit_factor,
            self.cfg.kelly_fraction,
            state.gross_equity(mid),
            mid,
            self.cfg.max_inventory,
        )?;

        let window = state.history.to_vec();
        let raw_alpha = self.alpha.raw_signal(&window, mid);
        let trend = raw_alpha / mid;
        let inv_ratio = state.inventory_ratio();
        let spread = self.final_spread(state, mid);
        let regime = self.classify(trend, raw_alpha, mid, state.inventory, inv_ratio);
        tracing::debug!(regime = regime.label(), trend, spread, "regime selected");

        if let Regime::ShieldUp = regime {
            // Cease fire on the ask; retreat the bid well below the rally.
            return Ok(Quote {
                bid: mid - spread * 2.0,
                ask: 0.0,
                quantity: order_qty,
            });
        }

        let (bid_bias, ask_bias) = regime.biases();
        let reservation = regime
            .reservation()
            .ok_or_else(|| EngineError::invalid_input("regime without reservation price"))?;
        let mut bid = reservation - (spread / 2.0) * bid_bias;
        let mut ask = reservation + (spread / 2.0) * ask_bias;

        if state.inventory >= self.cfg.max_inventory * INVENTORY_CAP_RATIO {
            bid = 0.0;
        }
        if state.inventory <= -self.cfg.max_inventory * INVENTORY_CAP_RATIO {
            ask = 0.0;
        }

        Ok(Quote {
            bid,
            ask,
            quantity: order_qty,
        })
    }

    /// First matching trend band wins, evaluated top to bottom.
    fn classify(
        &self,
        trend: f64,
        raw_alpha: f64,
        mid: f64,
        inventory: f64,
        inv_ratio: f64,
    ) -> Regime {
        if trend > self.cfg.momentum_threshold {
            Regime::ShieldUp
        } else if trend > MODERATE_TREND_BAND {
            Regime::ModerateUp {
                reservation: mid + inv_ratio.abs() * mid * MODERATE_SKEW_RATE,
            }
        } else if trend < -MODERATE_TREND_BAND {
            Regime::DownProtect {
                reservation: mid + raw_alpha,
            }
        } else {
            let dynamic_gamma = self.cfg.gamma
                * (inv_ratio.abs() * 4.0).exp().clamp(1.0, DYNAMIC_GAMMA_MAX);
            Regime::MeanReverting {
                reservation: mid - inventory * dynamic_gamma * self.cfg.sigma.powi(2)
                    + raw_alpha * MEAN_REVERT_ALPHA_BLEND,
            }
        }
    }

    /// Relative realized volatility over the last [`VOL_WINDOW`] samples, or
    /// the configured sigma while the window is still filling.
    fn volatility(&self, state: &StrategyState, mid: f64) -> f64 {
        let tail = state.history.tail(VOL_WINDOW);
        if tail.len() >= VOL_WINDOW {
            tail.iter().population_std_dev() / mid
        } else {
            self.cfg.sigma
        }
    }

    fn final_spread(&self, state: &StrategyState, mid: f64) -> f64 {
        let vol_multiplier =
            (self.volatility(state, mid) / VOL_BASELINE).clamp(1.0, VOL_MULTIPLIER_MAX);
        let min_barrier = mid * self.cfg.commission_rate * 4.0;
        let base_spread = (2.0 / self.cfg.gamma) * (1.0 + self.cfg.gamma / self.cfg.kappa).ln();
        base_spread.max(min_barrier) * vol_multiplier
    }
}
