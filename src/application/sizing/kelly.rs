//! Kelly criterion.

/// Kelly fraction `(b·p − q) / b` with `q = 1 − p`, clamped to `[0, 1]`.
///
/// `p` is the win probability and `b` the win/loss payoff ratio. Returns
/// zero for non-finite inputs or `b <= 0`.
#[must_use]
pub fn kelly_fraction(p: f64, b: f64) -> f64 {
    if !p.is_finite() || !b.is_finite() || b <= 0.0 {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    let q = 1.0 - p;
    ((b * p - q) / b).clamp(0.0, 1.0)
}

/// Kelly fraction scaled by `multiplier` and divided by `volatility`.
///
/// `volatility` below one is treated as one.
#[must_use]
pub fn scaled_kelly(p: f64, b: f64, multiplier: f64, volatility: f64) -> f64 {
    let multiplier = if multiplier.is_finite() {
        multiplier.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let volatility = if volatility.is_finite() {
        volatility.max(1.0)
    } else {
        1.0
    };
    kelly_fraction(p, b) * multiplier / volatility
}
