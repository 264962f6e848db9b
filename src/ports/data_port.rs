//! Price series provider port.

use crate::domain::error::VolscaleError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Split- and dividend-adjusted daily bars for `symbol` over the half-open
    /// window `[start_date, end_date)`.
    ///
    /// An empty vector is a valid answer; callers normalise order and
    /// duplicates themselves.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, VolscaleError>;
}
