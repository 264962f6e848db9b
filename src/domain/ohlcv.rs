//! Daily OHLCV bar representation and input normalisation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// True range of the first bar in a series, which has no previous close.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Sort ascending by date and drop repeated dates, keeping the first bar seen
/// for each date. Returns the normalised bars and the number dropped.
pub fn normalize_bars(mut bars: Vec<OhlcvBar>) -> (Vec<OhlcvBar>, usize) {
    // stable sort keeps provider order among equal dates
    bars.sort_by_key(|b| b.date);
    let before = bars.len();
    bars.dedup_by_key(|b| b.date);
    let dropped = before - bars.len();
    (bars, dropped)
}
