//! CSV file price adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with header `date,open,high,low,close,volume`.

use crate::domain::error::VolscaleError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, VolscaleError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| VolscaleError::Provider {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut bars = Vec::new();
        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| VolscaleError::Provider {
                reason: format!("{} row {}: {}", path.display(), line + 1, e),
            })?;

            if row.date < start_date || row.date >= end_date {
                continue;
            }

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_test_data() -> TempDir {
        let dir = TempDir::new().unwrap();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(dir.path().join("NVDA.csv"), csv_content).unwrap();
        fs::write(dir.path().join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            dir.path().join("BROKEN.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();

        dir
    }

    #[test]
    fn fetch_ohlcv_returns_correct_data() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter
            .fetch_ohlcv("NVDA", date(2024, 1, 1), date(2024, 2, 1))
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].symbol, "NVDA");
        assert_eq!(bars[0].date, date(2024, 1, 15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
    }

    #[test]
    fn end_date_is_exclusive() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter
            .fetch_ohlcv("NVDA", date(2024, 1, 16), date(2024, 1, 17))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(2024, 1, 16));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter
            .fetch_ohlcv("EMPTY", date(2024, 1, 1), date(2024, 2, 1))
            .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn missing_file_is_provider_error() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let result = adapter.fetch_ohlcv("XYZ", date(2024, 1, 1), date(2024, 2, 1));
        assert!(matches!(result, Err(VolscaleError::Provider { .. })));
    }

    #[test]
    fn malformed_row_is_provider_error() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let result = adapter.fetch_ohlcv("BROKEN", date(2024, 1, 1), date(2024, 2, 1));
        assert!(matches!(result, Err(VolscaleError::Provider { .. })));
    }
}
