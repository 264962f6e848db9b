//! RSI (Relative Strength Index) with Wilder smoothing.
//!
//! Gains and losses are close-to-close changes; the first bar has no previous
//! close and counts as a zero change. Both are smoothed with the recursive
//! average `avg[0] = x[0]`, `avg[i] = avg[i-1] + (x[i] - avg[i-1]) / n`.
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); avg_loss == 0 gives 100.
//!
//! Warmup: first (n-1) bars are invalid. RSI is carried on every record but
//! does not feed the exposure model.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::all_invalid(IndicatorType::Rsi(period), bars);
    }

    let alpha = 1.0 / period as f64;
    let mut values = Vec::with_capacity(bars.len());
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let change = if i == 0 {
            0.0
        } else {
            bar.close - bars[i - 1].close
        };
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain += alpha * (gain - avg_gain);
            avg_loss += alpha * (loss - avg_loss);
        }

        if i < period - 1 {
            values.push(IndicatorPoint::invalid(bar.date));
        } else {
            values.push(IndicatorPoint::valid(
                bar.date,
                rsi_from_averages(avg_gain, avg_loss),
            ));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
