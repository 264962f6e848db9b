//! Report generation port.

use crate::domain::error::VolscaleError;
use crate::domain::pipeline::BacktestRun;
use crate::domain::strategy::StrategyConfig;
use std::path::Path;

/// Port for writing backtest reports into an output directory.
pub trait ReportPort {
    fn write(
        &self,
        run: &BacktestRun,
        config: &StrategyConfig,
        output_dir: &Path,
    ) -> Result<(), VolscaleError>;
}
