use crate::errors::{EngineError, Result};

/// Smallest order the venue accepts; the Kelly output never goes below it.
pub const MIN_ORDER_QTY: f64 = 0.005;

/// Fractional-Kelly order quantity.
///
/// `f* = (p(b + 1) - 1) / b` from win rate `p` and profit factor `b`, scaled
/// down by `kelly_fraction`, converted to units at `mid_price` and clamped to
/// `[MIN_ORDER_QTY, max_inventory]`. The output is never negative.
pub fn kelly_quantity(
    win_rate: f64,
    profit_factor: f64,
    kelly_fraction: f64,
    equity: f64,
    mid_price: f64,
    max_inventory: f64,
) -> Result<f64> {
    if !mid_price.is_finite() || mid_price <= 0.0 {
        return Err(EngineError::invalid_input(format!(
            "kelly sizing requires a positive mid price, got {mid_price}"
        )));
    }
    let f_star = (win_rate * (profit_factor + 1.0) - 1.0) / profit_factor;
    let safe_fraction = f_star.max(0.0) * kelly_fraction;
    let target_qty = (equity * safe_fraction) / mid_price;
    Ok(target_qty.clamp(MIN_ORDER_QTY, max_inventory))
}
