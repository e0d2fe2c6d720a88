use ringbuffer::{AllocRingBuffer, RingBuffer, RingBufferExt, RingBufferRead, RingBufferWrite};

use super::types::{Side, TradeEvent};
use crate::config::StrategyConfig;

/// Mid-price lookback retained by the strategy state.
pub const HISTORY_WINDOW: usize = 100;

/// Bounded FIFO window of recent mid-prices. The underlying ring buffer is
/// sized to the next power of two, so the logical window is trimmed manually.
#[derive(Clone, Debug)]
pub struct PriceHistory {
    window: usize,
    prices: AllocRingBuffer<f64>,
}

impl PriceHistory {
    pub fn new(window: usize) -> Self {
        let capacity = window.next_power_of_two().max(2);
        Self {
            window,
            prices: AllocRingBuffer::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, price: f64) {
        self.prices.push(price);
        if self.prices.len() > self.window {
            let excess = self.prices.len() - self.window;
            for _ in 0..excess {
                let _ = self.prices.dequeue();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Full window, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.prices.iter().copied().collect()
    }

    /// Last `n` prices in chronological order; shorter when fewer are held.
    pub fn tail(&self, n: usize) -> Vec<f64> {
        let skip = self.prices.len().saturating_sub(n);
        self.prices.iter().skip(skip).copied().collect()
    }
}

/// Mutable bankroll and position state, exclusively owned by one driver per
/// run. `cash` changes only through [`StrategyState::on_trade`]; the stop
/// flag latches and is never reset.
#[derive(Clone, Debug)]
pub struct StrategyState {
    pub cash: f64,
    pub inventory: f64,
    pub history: PriceHistory,
    initial_balance: f64,
    commission_rate: f64,
    slippage_rate: f64,
    max_inventory: f64,
    is_stopped: bool,
    max_pnl_seen: f64,
}

impl StrategyState {
    pub fn new(cfg: &StrategyConfig) -> Self {
        Self {
            cash: cfg.initial_balance,
            inventory: 0.0,
            history: PriceHistory::new(HISTORY_WINDOW),
            initial_balance: cfg.initial_balance,
            commission_rate: cfg.commission_rate,
            slippage_rate: cfg.slippage_rate,
            max_inventory: cfg.max_inventory,
            is_stopped: false,
            max_pnl_seen: f64::NEG_INFINITY,
        }
    }

    /// Applies a fill to the bankroll: adverse slippage on the execution
    /// price, commission on the notional, then cash/inventory updates.
    pub fn on_trade(&mut self, event: &TradeEvent) {
        let slip = match event.side {
            Side::Buy => 1.0 + self.slippage_rate,
            Side::Sell => 1.0 - self.slippage_rate,
        };
        let exec_price = event.price * slip;
        let notional = exec_price * event.quantity;
        let fee = notional * self.commission_rate;
        match event.side {
            Side::Buy => {
                self.inventory += event.quantity;
                self.cash -= notional + fee;
            }
            Side::Sell => {
                self.inventory -= event.quantity;
                self.cash += notional - fee;
            }
        }
        tracing::debug!(
            side = event.side.as_str(),
            price = event.price,
            exec_price,
            quantity = event.quantity,
            inventory = self.inventory,
            cash = self.cash,
            "fill applied"
        );
    }

    /// Net P&L relative to the starting balance, marking inventory at `mid`.
    pub fn net_pnl(&self, mid: f64) -> f64 {
        (self.cash - self.initial_balance) + self.inventory * mid
    }

    /// Gross equity (cash plus marked inventory), the Kelly sizing base.
    pub fn gross_equity(&self, mid: f64) -> f64 {
        self.cash + self.inventory * mid
    }

    pub fn inventory_ratio(&self) -> f64 {
        self.inventory / self.max_inventory
    }

    pub fn max_inventory(&self) -> f64 {
        self.max_inventory
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn is_stopped(&self) -> bool {
        self.is_stopped
    }

    /// Latches the terminal stop state.
    pub fn halt(&mut self) {
        self.is_stopped = true;
    }

    pub fn max_pnl_seen(&self) -> f64 {
        self.max_pnl_seen
    }

    pub fn raise_watermark(&mut self, pnl: f64) {
        if pnl > self.max_pnl_seen {
            self.max_pnl_seen = pnl;
        }
    }

    /// Zeroes the position after a forced liquidation trade.
    pub fn flatten(&mut self) {
        self.inventory = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> StrategyState {
        StrategyState::new(&StrategyConfig::default())
    }

    #[test]
    fn history_evicts_beyond_window() {
        let mut history = PriceHistory::new(HISTORY_WINDOW);
        for i in 0..150 {
            history.push(i as f64);
        }
        assert_eq!(history.len(), HISTORY_WINDOW);
        let window = history.to_vec();
        assert_eq!(window.first().copied(), Some(50.0));
        assert_eq!(window.last().copied(), Some(149.0));
    }

    #[test]
    fn tail_is_chronological() {
        let mut history = PriceHistory::new(HISTORY_WINDOW);
        for i in 0..40 {
            history.push(i as f64);
        }
        let tail = history.tail(30);
        assert_eq!(tail.len(), 30);
        assert_eq!(tail[0], 10.0);
        assert_eq!(tail[29], 39.0);
        // Shorter than requested when the window is still filling.
        assert_eq!(history.tail(100).len(), 40);
    }

    #[test]
    fn buy_fill_applies_slippage_and_fee() {
        let mut s = state();
        s.on_trade(&TradeEvent {
            side: Side::Buy,
            price: 100.0,
            quantity: 0.01,
        });
        let exec = 100.0 * 1.0001;
        let notional = exec * 0.01;
        let fee = notional * 0.0005;
        assert!((s.inventory - 0.01).abs() < 1e-12);
        assert!((s.cash - (10_000.0 - notional - fee)).abs() < 1e-9);
    }

    #[test]
    fn sell_fill_applies_slippage_and_fee() {
        let mut s = state();
        s.on_trade(&TradeEvent {
            side: Side::Sell,
            price: 100.0,
            quantity: 0.01,
        });
        let exec = 100.0 * 0.9999;
        let notional = exec * 0.01;
        let fee = notional * 0.0005;
        assert!((s.inventory + 0.01).abs() < 1e-12);
        assert!((s.cash - (10_000.0 + notional - fee)).abs() < 1e-9);
    }

    #[test]
    fn pnl_marks_inventory_at_mid() {
        let mut s = state();
        s.on_trade(&TradeEvent {
            side: Side::Buy,
            price: 100.0,
            quantity: 0.02,
        });
        let pnl_flat = s.net_pnl(100.0);
        let pnl_up = s.net_pnl(110.0);
        assert!(pnl_up > pnl_flat);
        assert!((pnl_up - pnl_flat - 0.02 * 10.0).abs() < 1e-9);
    }
}
