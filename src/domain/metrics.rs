//! Summary statistics for a backtest run.
//!
//! Growth multiples and drawdowns only; no risk-adjusted ratios.

use crate::domain::drawdown::{max_drawdown, max_drawdown_duration};
use crate::domain::pipeline::BacktestRun;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CurveMetrics {
    pub final_multiple: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl CurveMetrics {
    pub fn compute(equity: &[f64]) -> Self {
        let final_multiple = equity.last().copied().unwrap_or(1.0);
        let total_return = final_multiple - 1.0;

        // the first day carries no return, so it does not count towards time
        let periods = equity.len().saturating_sub(1) as f64;
        let years = periods / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && final_multiple > 0.0 {
            final_multiple.powf(1.0 / years) - 1.0
        } else if years > 0.0 {
            -1.0
        } else {
            0.0
        };

        CurveMetrics {
            final_multiple,
            total_return,
            annualized_return,
            max_drawdown: max_drawdown(equity),
            max_drawdown_duration: max_drawdown_duration(equity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub strategy: CurveMetrics,
    pub buy_hold: CurveMetrics,
    pub trading_days: usize,
    /// Fraction of days with a non-zero position.
    pub time_in_market: f64,
    pub average_position: f64,
}

impl Metrics {
    pub fn compute(run: &BacktestRun) -> Self {
        let trading_days = run.len();
        let (time_in_market, average_position) = if trading_days > 0 {
            let invested = run.records.iter().filter(|r| r.position() > 0.0).count();
            let total: f64 = run.records.iter().map(|r| r.position()).sum();
            (
                invested as f64 / trading_days as f64,
                total / trading_days as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Metrics {
            strategy: CurveMetrics::compute(&run.equity_strategy()),
            buy_hold: CurveMetrics::compute(&run.equity_buy_hold()),
            trading_days,
            time_in_market,
            average_position,
        }
    }
}
