use super::state::StrategyState;
use crate::config::StrategyConfig;

/// Outcome of the per-step risk evaluation. `Stopped` is terminal: once
/// reached, every later evaluation reports it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskStatus {
    Active,
    Stopped,
}

impl RiskStatus {
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Stop-loss and trailing profit-lock, evaluated once per step before
/// quoting. A stop is an expected terminal business state, not an error.
#[derive(Clone, Copy, Debug)]
pub struct RiskStateMachine {
    stop_loss_limit: f64,
    profit_lock_threshold: f64,
    drawdown_limit: f64,
}

impl RiskStateMachine {
    pub fn new(cfg: &StrategyConfig) -> Self {
        Self {
            stop_loss_limit: cfg.stop_loss_limit,
            profit_lock_threshold: cfg.profit_lock_threshold,
            drawdown_limit: cfg.drawdown_limit,
        }
    }

    pub fn evaluate(&self, state: &mut StrategyState, mid: f64) -> RiskStatus {
        if state.is_stopped() {
            return RiskStatus::Stopped;
        }
        let pnl = state.net_pnl(mid);
        if pnl < self.stop_loss_limit {
            tracing::warn!(pnl, limit = self.stop_loss_limit, trigger = "stop_loss", "risk stop");
            state.halt();
            return RiskStatus::Stopped;
        }
        state.raise_watermark(pnl);
        let peak = state.max_pnl_seen();
        if peak > self.profit_lock_threshold && pnl < peak * (1.0 - self.drawdown_limit) {
            tracing::warn!(pnl, peak, trigger = "profit_lock", "risk stop");
            state.halt();
            return RiskStatus::Stopped;
        }
        RiskStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::types::{Side, TradeEvent};

    fn setup(stop_loss: f64) -> (RiskStateMachine, StrategyState) {
        let mut cfg = StrategyConfig::default();
        cfg.stop_loss_limit = stop_loss;
        (RiskStateMachine::new(&cfg), StrategyState::new(&cfg))
    }

    #[test]
    fn stays_active_at_zero_pnl() {
        let (risk, mut state) = setup(-50.0);
        for _ in 0..60 {
            assert_eq!(risk.evaluate(&mut state, 100.0), RiskStatus::Active);
        }
        assert!(!state.is_stopped());
    }

    #[test]
    fn stop_loss_latches() {
        let (risk, mut state) = setup(-1.0);
        // Buy high, mark low: unrealized loss breaches the limit.
        state.on_trade(&TradeEvent {
            side: Side::Buy,
            price: 100.0,
            quantity: 0.03,
        });
        assert_eq!(risk.evaluate(&mut state, 10.0), RiskStatus::Stopped);
        assert!(state.is_stopped());
        // Price recovery does not resurrect the run.
        for _ in 0..10 {
            assert_eq!(risk.evaluate(&mut state, 500.0), RiskStatus::Stopped);
        }
    }

    #[test]
    fn profit_lock_stops_after_peak_decay() {
        let mut cfg = StrategyConfig::default();
        cfg.profit_lock_threshold = 10.0;
        cfg.drawdown_limit = 0.20;
        cfg.stop_loss_limit = -1_000.0;
        let risk = RiskStateMachine::new(&cfg);
        let mut state = StrategyState::new(&cfg);
        state.on_trade(&TradeEvent {
            side: Side::Buy,
            price: 100.0,
            quantity: 0.03,
        });
        let entry_cost = 10_000.0 - state.cash;
        // Peak well above the lock threshold.
        let peak_mid = (entry_cost + 20.0) / 0.03;
        assert_eq!(risk.evaluate(&mut state, peak_mid), RiskStatus::Active);
        assert!(state.max_pnl_seen() > 10.0);
        // Give back more than 20% of the peak.
        let decayed_mid = (entry_cost + 10.0) / 0.03;
        assert_eq!(risk.evaluate(&mut state, decayed_mid), RiskStatus::Stopped);
    }

    #[test]
    fn watermark_is_monotone() {
        let (risk, mut state) = setup(-1_000.0);
        state.on_trade(&TradeEvent {
            side: Side::Buy,
            price: 100.0,
            quantity: 0.03,
        });
        risk.evaluate(&mut state, 200.0);
        let peak = state.max_pnl_seen();
        risk.evaluate(&mut state, 150.0);
        assert_eq!(state.max_pnl_seen(), peak);
        risk.evaluate(&mut state, 300.0);
        assert!(state.max_pnl_seen() > peak);
    }
}
