//! Per-day CSV export of every pipeline column.

use crate::domain::error::VolscaleError;
use crate::domain::pipeline::{BacktestRecord, BacktestRun};
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const CSV_FILE: &str = "backtest.csv";

#[derive(Debug, Serialize)]
struct CsvReportRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    ema_fast: f64,
    sma_slow: f64,
    atr: f64,
    atr_pct: Option<f64>,
    rsi: f64,
    signal: f64,
    weight: f64,
    position: f64,
    market_return: Option<f64>,
    strategy_return: f64,
    equity_strategy: f64,
    equity_buy_hold: f64,
    dd_strategy: f64,
    dd_buy_hold: f64,
}

impl From<&BacktestRecord> for CsvReportRow {
    fn from(r: &BacktestRecord) -> Self {
        let sized = &r.returns.sized;
        let ind = &sized.indicators;
        CsvReportRow {
            date: ind.bar.date,
            open: ind.bar.open,
            high: ind.bar.high,
            low: ind.bar.low,
            close: ind.bar.close,
            ema_fast: ind.ema_fast,
            sma_slow: ind.sma_slow,
            atr: ind.atr,
            atr_pct: ind.atr_pct,
            rsi: ind.rsi,
            signal: sized.signal,
            weight: sized.weight,
            position: sized.position,
            market_return: r.returns.market_return,
            strategy_return: r.returns.strategy_return,
            equity_strategy: r.returns.equity_strategy,
            equity_buy_hold: r.returns.equity_buy_hold,
            dd_strategy: r.dd_strategy,
            dd_buy_hold: r.dd_buy_hold,
        }
    }
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Render the run as CSV text, header included. Undefined values are empty
/// cells.
pub fn render_csv(run: &BacktestRun) -> Result<String, VolscaleError> {
    let to_io = |e: csv::Error| VolscaleError::Io(std::io::Error::other(e.to_string()));

    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in &run.records {
        wtr.serialize(CsvReportRow::from(record)).map_err(to_io)?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| VolscaleError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(data).map_err(|e| VolscaleError::Io(std::io::Error::other(e.to_string())))
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        run: &BacktestRun,
        _config: &StrategyConfig,
        output_dir: &Path,
    ) -> Result<(), VolscaleError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(CSV_FILE);
        fs::write(&path, render_csv(run)?)?;
        info!(path = %path.display(), rows = run.len(), "series exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exposure::ExposureParams;
    use crate::domain::indicator::test_bars::make_bars;
    use crate::domain::indicator::IndicatorParams;
    use crate::domain::pipeline::run_pipeline;

    fn sample_run() -> BacktestRun {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let params = IndicatorParams {
            ema_len: 2,
            sma_len: 4,
            atr_len: 3,
            rsi_len: 3,
        };
        run_pipeline("TEST", &make_bars(&prices), &params, &ExposureParams::default())
    }

    #[test]
    fn header_and_one_line_per_record() {
        let run = sample_run();
        let text = render_csv(&run).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), run.len() + 1);
        assert!(lines[0].starts_with("date,open,high,low,close,ema_fast"));
        assert!(lines[0].ends_with("dd_strategy,dd_buy_hold"));
        assert!(lines[1].starts_with(&run.records[0].date().to_string()));
    }

    #[test]
    fn first_market_return_is_blank() {
        let run = sample_run();
        let text = render_csv(&run).unwrap();
        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        let idx = headers.iter().position(|h| h == "market_return").unwrap();
        let first = rdr.records().next().unwrap().unwrap();
        assert_eq!(&first[idx], "");
    }

    #[test]
    fn empty_run_writes_nothing() {
        let run = BacktestRun {
            symbol: "TEST".into(),
            records: vec![],
        };
        assert_eq!(render_csv(&run).unwrap(), "");
    }
}
