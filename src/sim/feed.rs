use rand::distributions::Distribution;
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use statrs::distribution::Normal;

use crate::errors::{EngineError, Result};
use crate::strategy::types::MarketObservation;

const DEFAULT_LIQUIDITY: f64 = 1.0;

/// Raw candle row as it arrives from an external feed. Only `close` is
/// required; everything else degrades to a sensible default.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct RawCandle {
    pub timestamp: Option<i64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub bid_qty: Option<f64>,
    pub ask_qty: Option<f64>,
}

impl RawCandle {
    pub fn into_observation(self) -> Result<MarketObservation> {
        let close = self
            .close
            .filter(|c| c.is_finite())
            .ok_or_else(|| EngineError::malformed("candle is missing a close price"))?;
        Ok(MarketObservation {
            mid: close,
            high: self.high.filter(|v| v.is_finite()).unwrap_or(close),
            low: self.low.filter(|v| v.is_finite()).unwrap_or(close),
            bid_liquidity: self.bid_qty.unwrap_or(DEFAULT_LIQUIDITY),
            ask_liquidity: self.ask_qty.unwrap_or(DEFAULT_LIQUIDITY),
        })
    }
}

/// Parses a header-prefixed CSV candle dump into observations. A row whose
/// `close` is missing or unparseable aborts the whole feed.
pub fn parse_csv(text: &str) -> Result<Vec<MarketObservation>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| EngineError::malformed("empty observation feed"))?;
    let columns: Vec<&str> = header.split(',').map(|c| c.trim()).collect();
    let position = |name: &str| columns.iter().position(|c| *c == name);

    let close_idx = position("close")
        .ok_or_else(|| EngineError::malformed("feed header is missing a close column"))?;
    let high_idx = position("high");
    let low_idx = position("low");
    let bid_idx = position("bid_qty");
    let ask_idx = position("ask_qty");

    let mut observations = Vec::new();
    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        let field = |idx: Option<usize>| -> Option<f64> {
            idx.and_then(|i| fields.get(i))
                .and_then(|v| v.trim().parse::<f64>().ok())
        };
        let candle = RawCandle {
            close: field(Some(close_idx)),
            high: field(high_idx),
            low: field(low_idx),
            bid_qty: field(bid_idx),
            ask_qty: field(ask_idx),
            ..RawCandle::default()
        };
        let observation = candle.into_observation().map_err(|_| {
            EngineError::malformed(format!("row {}: missing or invalid close", row + 1))
        })?;
        observations.push(observation);
    }
    Ok(observations)
}

/// Synthetic arithmetic-Brownian price path with the given per-step noise
/// and drift, reproducible per seed. Highs and lows are a one-sigma band
/// around the mid so the candle-range fill rule stays usable on synthetic
/// paths; the stochastic fill rule ignores them.
pub fn gbm_path(
    steps: usize,
    start_price: f64,
    sigma: f64,
    drift: f64,
    seed: u64,
) -> Result<Vec<MarketObservation>> {
    if !start_price.is_finite() || start_price <= 0.0 {
        return Err(EngineError::invalid_input(
            "synthetic path requires a positive start price",
        ));
    }
    let noise = Normal::new(0.0, sigma)
        .map_err(|_| EngineError::invalid_input("synthetic path requires a positive sigma"))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = start_price;
    let mut path = Vec::with_capacity(steps);
    for _ in 0..steps {
        price = (price + noise.sample(&mut rng) + drift).max(0.01);
        path.push(MarketObservation {
            mid: price,
            high: price + sigma,
            low: (price - sigma).max(0.01),
            bid_liquidity: DEFAULT_LIQUIDITY,
            ask_liquidity: DEFAULT_LIQUIDITY,
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_header() {
        let text = "timestamp,open,high,low,close,volume,bid_qty,ask_qty\n\
                    1,100.0,101.0,99.0,100.5,10.0,2.0,3.0\n\
                    2,100.5,102.0,100.0,101.5,12.0,1.5,2.5\n";
        let obs = parse_csv(text).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].mid, 100.5);
        assert_eq!(obs[0].high, 101.0);
        assert_eq!(obs[0].low, 99.0);
        assert_eq!(obs[1].bid_liquidity, 1.5);
    }

    #[test]
    fn missing_liquidity_defaults_to_one() {
        let text = "timestamp,open,high,low,close,volume\n1,100,101,99,100.5,10\n";
        let obs = parse_csv(text).unwrap();
        assert_eq!(obs[0].bid_liquidity, 1.0);
        assert_eq!(obs[0].ask_liquidity, 1.0);
    }

    #[test]
    fn missing_close_column_is_malformed() {
        let text = "timestamp,open,high,low,volume\n1,100,101,99,10\n";
        let err = parse_csv(text).unwrap_err();
        assert!(matches!(err, EngineError::MalformedObservation(_)));
    }

    #[test]
    fn unparseable_close_aborts_the_feed() {
        let text = "close\n100.0\nnot-a-number\n";
        let err = parse_csv(text).unwrap_err();
        assert!(matches!(err, EngineError::MalformedObservation(_)));
    }

    #[test]
    fn candle_without_range_collapses_to_close() {
        let candle = RawCandle {
            close: Some(42.0),
            ..RawCandle::default()
        };
        let obs = candle.into_observation().unwrap();
        assert_eq!(obs.high, 42.0);
        assert_eq!(obs.low, 42.0);
    }

    #[test]
    fn synthetic_path_is_reproducible() {
        let a = gbm_path(500, 100.0, 0.05, 0.002, 9).unwrap();
        let b = gbm_path(500, 100.0, 0.05, 0.002, 9).unwrap();
        assert_eq!(a.len(), 500);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.mid, y.mid);
        }
        assert!(a.iter().all(|o| o.mid > 0.0 && o.low <= o.mid && o.high >= o.mid));
    }

    #[test]
    fn synthetic_path_rejects_bad_parameters() {
        assert!(gbm_path(10, 0.0, 0.05, 0.0, 1).is_err());
        assert!(gbm_path(10, 100.0, -0.1, 0.0, 1).is_err());
    }
}
