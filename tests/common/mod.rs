#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::Cell;
use volscale::domain::error::VolscaleError;
use volscale::domain::exposure::ExposureParams;
use volscale::domain::indicator::IndicatorParams;
pub use volscale::domain::ohlcv::OhlcvBar;
use volscale::domain::strategy::{DataSource, StrategyConfig};
use volscale::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
    pub calls: Cell<usize>,
}

impl MockDataPort {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self {
            bars,
            error: None,
            calls: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        _symbol: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, VolscaleError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = &self.error {
            return Err(VolscaleError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day from 2024-01-01 with a ±1 range around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            symbol: "TEST".to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.0),
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Bars whose high, low and close are all equal: zero true range.
pub fn flat_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    bars_from_closes(closes)
        .into_iter()
        .map(|b| OhlcvBar {
            high: b.close,
            low: b.close,
            ..b
        })
        .collect()
}

pub fn rising_closes(count: usize, start_price: f64) -> Vec<f64> {
    (0..count).map(|i| start_price + i as f64).collect()
}

/// Deterministic zig-zag with drift, enough to flip the trend signal.
pub fn wavy_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.1 * t + 8.0 * (t / 9.0).sin() + 2.0 * (t / 2.0).cos()
        })
        .collect()
}

pub fn small_params() -> IndicatorParams {
    IndicatorParams {
        ema_len: 3,
        sma_len: 8,
        atr_len: 4,
        rsi_len: 4,
    }
}

pub fn sample_config(output_dir: &std::path::Path) -> StrategyConfig {
    StrategyConfig {
        symbol: "TEST".into(),
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
        indicators: small_params(),
        exposure: ExposureParams::default(),
        data: DataSource::Csv {
            dir: output_dir.to_path_buf(),
        },
        output_dir: output_dir.to_path_buf(),
    }
}
