//! Run configuration for one volatility-scaled trend backtest.

use crate::domain::exposure::ExposureParams;
use crate::domain::indicator::IndicatorParams;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const ALPACA_BASE_URL: &str = "https://data.alpaca.markets";

/// Where daily bars come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Alpaca market-data REST API. Credentials are read from the environment.
    Alpaca { base_url: String, timeout_secs: u64 },
    /// `<dir>/<SYMBOL>.csv` files.
    Csv { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub symbol: String,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub indicators: IndicatorParams,
    pub exposure: ExposureParams,
    pub data: DataSource,
    pub output_dir: PathBuf,
}

impl StrategyConfig {
    pub fn describe(&self) -> String {
        format!(
            "{} EMA({}) > SMA({}), ATR({}) target {:.2}%, exposure [{}, {}]",
            self.symbol,
            self.indicators.ema_len,
            self.indicators.sma_len,
            self.indicators.atr_len,
            self.exposure.target_atr_pct * 100.0,
            self.exposure.min_exposure,
            self.exposure.max_exposure,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> StrategyConfig {
        StrategyConfig {
            symbol: "NVDA".into(),
            start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            indicators: IndicatorParams::default(),
            exposure: ExposureParams::default(),
            data: DataSource::Csv {
                dir: PathBuf::from("data"),
            },
            output_dir: PathBuf::from("report"),
        }
    }

    #[test]
    fn describe_names_parameters() {
        assert_eq!(
            sample_config().describe(),
            "NVDA EMA(20) > SMA(50), ATR(14) target 2.00%, exposure [0, 1]"
        );
    }
}
