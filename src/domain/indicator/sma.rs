//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), kept as a running sum.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::all_invalid(IndicatorType::Sma(period), bars);
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= period {
            sum -= bars[i - period].close;
        }

        if i + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
        } else {
            values.push(IndicatorPoint::valid(bar.date, sum / period as f64));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::make_bars;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let series = calculate_sma(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn sma_rolls_window() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        let series = calculate_sma(&bars, 3);

        assert_relative_eq!(series.get(2).unwrap(), 2.0);
        assert_relative_eq!(series.get(3).unwrap(), 3.0);
        assert_relative_eq!(series.get(4).unwrap(), 17.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn sma_constant_series() {
        let bars = make_bars(&[100.0; 10]);
        let series = calculate_sma(&bars, 4);
        for i in 3..10 {
            assert_relative_eq!(series.get(i).unwrap(), 100.0);
        }
    }

    #[test]
    fn sma_shorter_than_period() {
        let bars = make_bars(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 5);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_period_0_and_empty() {
        assert!(calculate_sma(&[], 3).is_empty());
        let bars = make_bars(&[1.0]);
        assert!(!calculate_sma(&bars, 0).values[0].valid);
    }

    #[test]
    fn sma_indicator_type() {
        let series = calculate_sma(&[], 50);
        assert_eq!(series.indicator_type, IndicatorType::Sma(50));
    }
}
