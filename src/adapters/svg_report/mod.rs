//! SVG chart report.
//!
//! Writes three standalone charts into the output directory: `equity.svg`
//! (strategy vs buy & hold), `drawdown.svg` (both drawdown curves) and
//! `exposure.svg` (ATR% and position size).

pub mod chart_svg;

use crate::domain::error::VolscaleError;
use crate::domain::pipeline::BacktestRun;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;
use tracing::info;

pub const EQUITY_FILE: &str = "equity.svg";
pub const DRAWDOWN_FILE: &str = "drawdown.svg";
pub const EXPOSURE_FILE: &str = "exposure.svg";

#[derive(Debug, Default)]
pub struct SvgReportAdapter;

impl SvgReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for SvgReportAdapter {
    fn write(
        &self,
        run: &BacktestRun,
        config: &StrategyConfig,
        output_dir: &Path,
    ) -> Result<(), VolscaleError> {
        fs::create_dir_all(output_dir)?;

        let charts = [
            (
                EQUITY_FILE,
                chart_svg::render_line_chart(
                    &format!("{} - Equity Curves", config.symbol),
                    "Growth of 1.0",
                    &run.equity_curves(),
                ),
            ),
            (
                DRAWDOWN_FILE,
                chart_svg::render_line_chart(
                    &format!("{} - Drawdowns", config.symbol),
                    "Drawdown",
                    &run.drawdown_curves(),
                ),
            ),
            (
                EXPOSURE_FILE,
                chart_svg::render_line_chart(
                    &format!("{} - Volatility & Exposure", config.symbol),
                    "Fraction",
                    &run.exposure_curves(),
                ),
            ),
        ];

        for (name, svg) in charts {
            if svg.is_empty() {
                continue;
            }
            let path = output_dir.join(name);
            fs::write(&path, svg)?;
            info!(path = %path.display(), "chart written");
        }

        Ok(())
    }
}
