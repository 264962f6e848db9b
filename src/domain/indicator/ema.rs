//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), EMA[0] = C[0], then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! The recursion runs from the first bar; the first (n-1) points are flagged
//! invalid so the seed has had n bars to decay.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::all_invalid(IndicatorType::Ema(period), bars);
    }

    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        ema = if i == 0 {
            bar.close
        } else {
            bar.close * k + ema * (1.0 - k)
        };

        if i < period - 1 {
            values.push(IndicatorPoint::invalid(bar.date));
        } else {
            values.push(IndicatorPoint::valid(bar.date, ema));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
