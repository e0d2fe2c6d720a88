/// Mid-price samples the forecasting model sees per call.
pub const ALPHA_WINDOW: usize = 50;

const NORM_EPSILON: f64 = 1e-8;

/// Black-box price forecaster. Receives the most recent mid-prices min-max
/// normalized to `[0, 1]` (oldest first) and returns a scalar prediction in
/// the same normalized space. Implementations must be deterministic for
/// identical inputs and must not retain or mutate the window.
pub trait AlphaModel: Send {
    fn forecast(&self, window: &[f64]) -> f64;
}

/// Predicts the last observed price; de-normalized, its signal is (near)
/// zero, which makes it the neutral stand-in model.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatForecast;

impl AlphaModel for FlatForecast {
    fn forecast(&self, window: &[f64]) -> f64 {
        window.last().copied().unwrap_or(0.5)
    }
}

/// Extrapolates the average one-step drift over the tail of the window.
#[derive(Clone, Copy, Debug)]
pub struct DriftForecast {
    pub lookback: usize,
}

impl Default for DriftForecast {
    fn default() -> Self {
        Self { lookback: 10 }
    }
}

impl AlphaModel for DriftForecast {
    fn forecast(&self, window: &[f64]) -> f64 {
        let Some(&last) = window.last() else {
            return 0.5;
        };
        let lookback = self.lookback.min(window.len());
        if lookback < 2 {
            return last;
        }
        let first = window[window.len() - lookback];
        let slope = (last - first) / (lookback as f64 - 1.0);
        last + slope
    }
}

/// Port wrapping the external forecaster: windows the price history,
/// normalizes it, de-normalizes the model output back to price units and
/// weights the distance from the current mid.
pub struct AlphaSignal {
    model: Box<dyn AlphaModel>,
    weight: f64,
}

impl AlphaSignal {
    pub fn new(model: Box<dyn AlphaModel>, weight: f64) -> Self {
        Self { model, weight }
    }

    /// Neutral signal source regardless of the configured weight.
    pub fn neutral(weight: f64) -> Self {
        Self::new(Box::new(FlatForecast), weight)
    }

    /// Weighted price-unit signal `(forecast - mid) * weight`, or `0.0`
    /// while fewer than [`ALPHA_WINDOW`] samples are available.
    pub fn raw_signal(&self, history: &[f64], mid: f64) -> f64 {
        if history.len() < ALPHA_WINDOW {
            return 0.0;
        }
        let recent = &history[history.len() - ALPHA_WINDOW..];
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &p in recent {
            min = min.min(p);
            max = max.max(p);
        }
        let range = max - min + NORM_EPSILON;
        let scaled: Vec<f64> = recent.iter().map(|p| (p - min) / range).collect();
        let prediction = self.model.forecast(&scaled);
        (prediction * range + min - mid) * self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn short_window_is_neutral() {
        let signal = AlphaSignal::new(Box::new(DriftForecast::default()), 0.8);
        assert_eq!(signal.raw_signal(&ramp(ALPHA_WINDOW - 1), 49.0), 0.0);
        assert_eq!(signal.raw_signal(&[], 100.0), 0.0);
    }

    #[test]
    fn flat_forecast_is_near_zero_on_any_window() {
        let signal = AlphaSignal::neutral(0.8);
        let prices = ramp(ALPHA_WINDOW);
        let mid = *prices.last().unwrap();
        let raw = signal.raw_signal(&prices, mid);
        assert!(raw.abs() < 1e-6, "raw signal {raw} not neutral");
    }

    #[test]
    fn drift_forecast_is_positive_on_rising_prices() {
        let signal = AlphaSignal::new(Box::new(DriftForecast::default()), 0.8);
        let prices = ramp(60);
        let mid = *prices.last().unwrap();
        let raw = signal.raw_signal(&prices, mid);
        // Unit slope extrapolates one step ahead, weighted by 0.8.
        assert!((raw - 0.8).abs() < 1e-6, "raw signal {raw}");
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let signal = AlphaSignal::new(Box::new(DriftForecast::default()), 0.8);
        let prices = ramp(55);
        let a = signal.raw_signal(&prices, 55.0);
        let b = signal.raw_signal(&prices, 55.0);
        assert_eq!(a, b);
    }

    #[test]
    fn constant_window_survives_zero_range() {
        let signal = AlphaSignal::new(Box::new(DriftForecast::default()), 0.8);
        let prices = vec![100.0; ALPHA_WINDOW];
        let raw = signal.raw_signal(&prices, 100.0);
        assert!(raw.is_finite());
        assert!(raw.abs() < 1e-6);
    }
}
