//! Drawdown analysis over an equity curve.
//!
//! `drawdown(t) = (equity(t) - peak(t)) / peak(t)` with `peak` the running
//! maximum. A non-positive peak yields 0.0. Simulated curves start at 1.0, so
//! that branch only matters for curves built elsewhere; a curve wiped out
//! after starting at 1.0 reads -1.0 from then on.

/// Running maximum of `equity`.
pub fn running_peak(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&e| {
            peak = peak.max(e);
            peak
        })
        .collect()
}

pub fn drawdown_at(equity: f64, peak: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    // equity == peak must give exactly 0.0, not -0.0
    if equity >= peak {
        return 0.0;
    }
    (equity - peak) / peak
}

pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    equity
        .iter()
        .zip(running_peak(equity))
        .map(|(&e, peak)| drawdown_at(e, peak))
        .collect()
}

/// Deepest drawdown as a positive fraction (0.25 for a 25% fall).
pub fn max_drawdown(equity: &[f64]) -> f64 {
    drawdown_series(equity)
        .into_iter()
        .fold(0.0_f64, |worst, dd| worst.max(-dd))
}

/// Longest run of consecutive days spent below the running peak.
pub fn max_drawdown_duration(equity: &[f64]) -> usize {
    let mut longest = 0;
    let mut current = 0;

    for dd in drawdown_series(equity) {
        if dd < 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    longest
}
