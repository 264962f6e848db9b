//! Return simulator.
//!
//! Applies each day's position to the *next* day's close-to-close return and
//! compounds the strategy and buy-and-hold equity curves from 1.0.
//!
//! The position sized at the close of day t is only ever multiplied by the
//! return realised from t to t+1: [`strategy_return`] takes the previous
//! day's position as its argument, so the current day's position cannot
//! leak into the current day's return.

use crate::domain::exposure::PositionRecord;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRecord {
    pub sized: PositionRecord,
    /// `None` on the first day and after a zero close.
    pub market_return: Option<f64>,
    pub strategy_return: f64,
    pub equity_strategy: f64,
    pub equity_buy_hold: f64,
}

impl ReturnRecord {
    pub fn date(&self) -> NaiveDate {
        self.sized.indicators.bar.date
    }
}

/// `close / prev_close - 1`, undefined when the previous close is zero or
/// either price is not finite.
pub fn market_return(prev_close: f64, close: f64) -> Option<f64> {
    if prev_close == 0.0 || !prev_close.is_finite() || !close.is_finite() {
        return None;
    }
    Some(close / prev_close - 1.0)
}

/// Return earned by holding `prev_position` over a day whose market return is
/// `market_return`. No prior position or no market return earns nothing.
pub fn strategy_return(prev_position: Option<f64>, market_return: Option<f64>) -> f64 {
    match (prev_position, market_return) {
        (Some(position), Some(ret)) => position * ret,
        _ => 0.0,
    }
}

/// One compounding step. A wiped-out curve stays at zero; a loss beyond
/// -100% (possible with leverage above 1.0) is floored at zero as well.
pub fn compound(prev_equity: f64, ret: f64) -> f64 {
    (prev_equity * (1.0 + ret)).max(0.0)
}

pub fn simulate(records: &[PositionRecord]) -> Vec<ReturnRecord> {
    let mut out: Vec<ReturnRecord> = Vec::with_capacity(records.len());
    let mut equity_strategy = 1.0;
    let mut equity_buy_hold = 1.0;

    for (i, record) in records.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| &records[j]);

        let market = prev.and_then(|p| market_return(p.close(), record.close()));
        let strat = strategy_return(prev.map(|p| p.position), market);

        equity_strategy = compound(equity_strategy, strat);
        equity_buy_hold = compound(equity_buy_hold, market.unwrap_or(0.0));

        out.push(ReturnRecord {
            sized: record.clone(),
            market_return: market,
            strategy_return: strat,
            equity_strategy,
            equity_buy_hold,
        });
    }

    out
}
