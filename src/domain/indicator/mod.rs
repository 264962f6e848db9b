//! Indicator engine.
//!
//! Each indicator returns an [`IndicatorSeries`] with one point per input bar;
//! points inside the indicator's warm-up are flagged invalid. [`annotate`]
//! joins the configured indicators onto the bars, and [`drop_warmup`] trims
//! every row with an undefined moving average, ATR or RSI so downstream stages
//! only ever see records past the warm-up.

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub(crate) fn invalid(date: NaiveDate) -> Self {
        IndicatorPoint {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub(crate) fn valid(date: NaiveDate, value: f64) -> Self {
        IndicatorPoint {
            date,
            valid: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Sma(usize),
    Atr(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn all_invalid(indicator_type: IndicatorType, bars: &[OhlcvBar]) -> Self {
        IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        }
    }

    /// Value at `index`, or `None` inside the warm-up or past the end.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// Window lengths for the four configured indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ema_len: usize,
    pub sma_len: usize,
    pub atr_len: usize,
    pub rsi_len: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ema_len: 20,
            sma_len: 50,
            atr_len: 14,
            rsi_len: 14,
        }
    }
}

impl IndicatorParams {
    /// Number of leading bars with at least one undefined indicator.
    ///
    /// Every indicator becomes valid at index `n - 1`, so this is the longest
    /// window minus one.
    pub fn warmup(&self) -> usize {
        [self.ema_len, self.sma_len, self.atr_len, self.rsi_len]
            .into_iter()
            .max()
            .unwrap_or(0)
            .saturating_sub(1)
    }

    /// Minimum number of bars that leaves at least one defined record.
    pub fn min_bars(&self) -> usize {
        self.warmup() + 1
    }
}

/// One bar joined with its indicator values; `None` inside a warm-up.
#[derive(Debug, Clone)]
pub struct IndicatorRow {
    pub bar: OhlcvBar,
    pub ema_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub atr: Option<f64>,
    pub atr_pct: Option<f64>,
    pub rsi: Option<f64>,
}

/// An [`IndicatorRow`] past every warm-up.
///
/// `atr_pct` stays optional: a zero close after the warm-up leaves it
/// undefined without removing the day, so the price collapse still reaches
/// the return simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub bar: OhlcvBar,
    pub ema_fast: f64,
    pub sma_slow: f64,
    pub atr: f64,
    pub atr_pct: Option<f64>,
    pub rsi: f64,
}

/// `atr / close`, undefined when either input is unusable.
pub fn atr_pct(atr: Option<f64>, close: f64) -> Option<f64> {
    let atr = atr?;
    if close == 0.0 || !close.is_finite() || !atr.is_finite() {
        return None;
    }
    Some(atr / close)
}

pub fn annotate(bars: &[OhlcvBar], params: &IndicatorParams) -> Vec<IndicatorRow> {
    let ema = ema::calculate_ema(bars, params.ema_len);
    let sma = sma::calculate_sma(bars, params.sma_len);
    let atr = atr::calculate_atr(bars, params.atr_len);
    let rsi = rsi::calculate_rsi(bars, params.rsi_len);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let atr_value = atr.get(i);
            IndicatorRow {
                bar: bar.clone(),
                ema_fast: ema.get(i),
                sma_slow: sma.get(i),
                atr: atr_value,
                atr_pct: atr_pct(atr_value, bar.close),
                rsi: rsi.get(i),
            }
        })
        .collect()
}

pub fn drop_warmup(rows: &[IndicatorRow]) -> Vec<IndicatorRecord> {
    rows.iter()
        .filter_map(|row| {
            Some(IndicatorRecord {
                bar: row.bar.clone(),
                ema_fast: row.ema_fast?,
                sma_slow: row.sma_slow?,
                atr: row.atr?,
                atr_pct: row.atr_pct,
                rsi: row.rsi?,
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_bars {
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    pub fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }
}
