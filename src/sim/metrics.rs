use statrs::statistics::Statistics;

use crate::strategy::types::PerformanceReport;

const SHARPE_EPSILON: f64 = 1e-8;

/// Incremental running statistics over a P&L series. Histories are
/// append-only and live for exactly one run.
#[derive(Clone, Debug, Default)]
pub struct MetricsAccumulator {
    pnl_history: Vec<f64>,
    step_returns: Vec<f64>,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the equity at the end of a step. The first observation seeds
    /// the history without producing a return.
    pub fn observe(&mut self, equity: f64) {
        if let Some(&last) = self.pnl_history.last() {
            self.step_returns.push(equity - last);
        }
        self.pnl_history.push(equity);
    }

    pub fn steps(&self) -> usize {
        self.pnl_history.len()
    }

    /// Final scorecard, or `None` before any step return exists (fewer than
    /// two observed steps).
    pub fn report(&self) -> Option<PerformanceReport> {
        if self.step_returns.is_empty() {
            return None;
        }
        let total_pnl = *self.pnl_history.last()?;
        let mean = self.step_returns.iter().mean();
        let std_dev = self.step_returns.iter().population_std_dev();
        let sharpe_ratio = mean / (std_dev + SHARPE_EPSILON);

        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown: f64 = 0.0;
        for &pnl in &self.pnl_history {
            peak = peak.max(pnl);
            max_drawdown = max_drawdown.max(peak - pnl);
        }

        let wins = self.step_returns.iter().filter(|r| **r > 0.0).count();
        let win_rate = wins as f64 / self.step_returns.len() as f64;

        Some(PerformanceReport {
            total_pnl,
            sharpe_ratio,
            max_drawdown,
            win_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulate(series: &[f64]) -> MetricsAccumulator {
        let mut acc = MetricsAccumulator::new();
        for &e in series {
            acc.observe(e);
        }
        acc
    }

    #[test]
    fn empty_and_single_step_yield_no_report() {
        assert!(MetricsAccumulator::new().report().is_none());
        assert!(accumulate(&[5.0]).report().is_none());
    }

    #[test]
    fn total_pnl_is_last_observation() {
        let acc = accumulate(&[0.0, 2.0, -1.0, 3.5]);
        let report = acc.report().unwrap();
        assert_eq!(report.total_pnl, 3.5);
    }

    #[test]
    fn drawdown_is_zero_for_non_decreasing_series() {
        let acc = accumulate(&[0.0, 1.0, 1.0, 2.0, 5.0]);
        let report = acc.report().unwrap();
        assert_eq!(report.max_drawdown, 0.0);
    }

    #[test]
    fn drawdown_measures_peak_to_trough() {
        let acc = accumulate(&[0.0, 10.0, 4.0, 7.0, 2.0, 9.0]);
        let report = acc.report().unwrap();
        assert_eq!(report.max_drawdown, 8.0);
        assert!(report.max_drawdown >= 0.0);
    }

    #[test]
    fn zero_variance_sharpe_is_finite() {
        let acc = accumulate(&[1.0; 10]);
        let report = acc.report().unwrap();
        assert!(report.sharpe_ratio.is_finite());
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.win_rate, 0.0);
    }

    #[test]
    fn win_rate_counts_positive_returns() {
        // Returns: +1, -1, +2, +1 -> 3 of 4 positive.
        let acc = accumulate(&[0.0, 1.0, 0.0, 2.0, 3.0]);
        let report = acc.report().unwrap();
        assert!((report.win_rate - 0.75).abs() < 1e-12);
    }
}
