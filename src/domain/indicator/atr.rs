//! Average True Range with Wilder smoothing.
//!
//! TR[0] = H[0] - L[0]; TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR[n-1] = mean(TR[0..n]); ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period {
        return IndicatorSeries::all_invalid(IndicatorType::Atr(period), bars);
    }

    let tr_values = true_ranges(bars);
    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        atr = if i == period - 1 {
            tr_values[..period].iter().sum::<f64>() / period as f64
        } else {
            (atr * (period - 1) as f64 + tr_values[i]) / period as f64
        };
        values.push(IndicatorPoint::valid(bar.date, atr));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
