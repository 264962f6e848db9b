//! Signal → position → equity pipeline.
//!
//! Chains the stages as pure functions over immutable slices:
//! [`annotate`] → [`drop_warmup`] → [`size_positions`] → [`simulate`] →
//! drawdowns. Empty or too-short input produces an empty [`BacktestRun`]
//! rather than an error; callers decide whether that is fatal.

use crate::domain::drawdown::drawdown_series;
use crate::domain::exposure::{size_positions, ExposureParams};
use crate::domain::indicator::{annotate, drop_warmup, IndicatorParams};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::simulator::{simulate, ReturnRecord};
use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRecord {
    pub returns: ReturnRecord,
    pub dd_strategy: f64,
    pub dd_buy_hold: f64,
}

impl BacktestRecord {
    pub fn date(&self) -> NaiveDate {
        self.returns.date()
    }

    pub fn close(&self) -> f64 {
        self.returns.sized.close()
    }

    pub fn atr_pct(&self) -> Option<f64> {
        self.returns.sized.indicators.atr_pct
    }

    pub fn position(&self) -> f64 {
        self.returns.sized.position
    }
}

/// One named, date-ordered series handed to reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    pub symbol: String,
    pub records: Vec<BacktestRecord>,
}

impl BacktestRun {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Final strategy equity; 1.0 for an empty run.
    pub fn strategy_multiple(&self) -> f64 {
        self.records
            .last()
            .map_or(1.0, |r| r.returns.equity_strategy)
    }

    pub fn buy_hold_multiple(&self) -> f64 {
        self.records
            .last()
            .map_or(1.0, |r| r.returns.equity_buy_hold)
    }

    pub fn equity_strategy(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.returns.equity_strategy).collect()
    }

    pub fn equity_buy_hold(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.returns.equity_buy_hold).collect()
    }

    fn series(&self, name: &'static str, f: impl Fn(&BacktestRecord) -> Option<f64>) -> Series {
        Series {
            name,
            points: self
                .records
                .iter()
                .filter_map(|r| f(r).map(|v| (r.date(), v)))
                .collect(),
        }
    }

    pub fn equity_curves(&self) -> [Series; 2] {
        [
            self.series("Strategy", |r| Some(r.returns.equity_strategy)),
            self.series("Buy & Hold", |r| Some(r.returns.equity_buy_hold)),
        ]
    }

    pub fn drawdown_curves(&self) -> [Series; 2] {
        [
            self.series("Strategy Drawdown", |r| Some(r.dd_strategy)),
            self.series("Buy & Hold Drawdown", |r| Some(r.dd_buy_hold)),
        ]
    }

    /// ATR% skips days where it is undefined.
    pub fn exposure_curves(&self) -> [Series; 2] {
        [
            self.series("ATR %", BacktestRecord::atr_pct),
            self.series("Position Size", |r| Some(r.position())),
        ]
    }
}

pub fn with_drawdowns(returns: Vec<ReturnRecord>) -> Vec<BacktestRecord> {
    let strategy: Vec<f64> = returns.iter().map(|r| r.equity_strategy).collect();
    let buy_hold: Vec<f64> = returns.iter().map(|r| r.equity_buy_hold).collect();
    let dd_strategy = drawdown_series(&strategy);
    let dd_buy_hold = drawdown_series(&buy_hold);

    returns
        .into_iter()
        .zip(dd_strategy.into_iter().zip(dd_buy_hold))
        .map(|(returns, (dd_strategy, dd_buy_hold))| BacktestRecord {
            returns,
            dd_strategy,
            dd_buy_hold,
        })
        .collect()
}

/// Run every stage over `bars`, which must already be date-ordered and free
/// of duplicates (see [`crate::domain::ohlcv::normalize_bars`]).
pub fn run_pipeline(
    symbol: &str,
    bars: &[OhlcvBar],
    indicators: &IndicatorParams,
    exposure: &ExposureParams,
) -> BacktestRun {
    let rows = annotate(bars, indicators);
    let defined = drop_warmup(&rows);
    debug!(
        bars = bars.len(),
        records = defined.len(),
        warmup = indicators.warmup(),
        "indicators computed"
    );

    let sized = size_positions(&defined, exposure);
    let returns = simulate(&sized);
    let records = with_drawdowns(returns);
    debug!(records = records.len(), "backtest simulated");

    BacktestRun {
        symbol: symbol.to_string(),
        records,
    }
}
