//! Configuration validation.
//!
//! Every key is checked before any data is fetched; defaults are those of
//! [`IndicatorParams::default`] and [`ExposureParams::default`].

use crate::domain::error::VolscaleError;
use crate::domain::exposure::ExposureParams;
use crate::domain::indicator::IndicatorParams;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const WINDOW_KEYS: [&str; 4] = ["ema_len", "sma_len", "atr_len", "rsi_len"];
pub const PROVIDERS: [&str; 2] = ["alpaca", "csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    validate_symbol(config)?;
    validate_dates(config)?;
    validate_windows(config)?;
    validate_target_atr_pct(config)?;
    validate_exposure_bounds(config)?;
    validate_data_source(config)?;
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(VolscaleError::invalid("backtest", "symbol", "symbol must not be empty")),
        None => Err(VolscaleError::missing("backtest", "symbol")),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(VolscaleError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, VolscaleError> {
    match value {
        None => Err(VolscaleError::missing("backtest", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            VolscaleError::invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

/// Present keys must parse; absent keys fall back to their default.
fn parse_number<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, VolscaleError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| VolscaleError::invalid(section, key, format!("'{}' is not a number", raw))),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    for key in WINDOW_KEYS {
        if let Some(len) = parse_number::<i64>(config, "strategy", key)? {
            if len < 1 {
                return Err(VolscaleError::invalid(
                    "strategy",
                    key,
                    format!("{} must be a positive integer", key),
                ));
            }
        }
    }
    Ok(())
}

fn validate_target_atr_pct(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    if let Some(value) = parse_number::<f64>(config, "strategy", "target_atr_pct")? {
        if !value.is_finite() || value <= 0.0 {
            return Err(VolscaleError::invalid(
                "strategy",
                "target_atr_pct",
                "target_atr_pct must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_exposure_bounds(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    let defaults = ExposureParams::default();
    let min = parse_number::<f64>(config, "strategy", "min_exposure")?.unwrap_or(defaults.min_exposure);
    let max = parse_number::<f64>(config, "strategy", "max_exposure")?.unwrap_or(defaults.max_exposure);

    if !min.is_finite() || min < 0.0 {
        return Err(VolscaleError::invalid(
            "strategy",
            "min_exposure",
            "min_exposure must be non-negative",
        ));
    }
    if !max.is_finite() {
        return Err(VolscaleError::invalid(
            "strategy",
            "max_exposure",
            "max_exposure must be finite",
        ));
    }
    if min > max {
        return Err(VolscaleError::invalid(
            "strategy",
            "min_exposure",
            "min_exposure must not exceed max_exposure",
        ));
    }
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), VolscaleError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| PROVIDERS[0].to_string());
    if !PROVIDERS.contains(&provider.trim().to_lowercase().as_str()) {
        return Err(VolscaleError::invalid(
            "data",
            "provider",
            format!("unknown provider '{}', expected alpaca or csv", provider),
        ));
    }

    if let Some(timeout) = parse_number::<i64>(config, "data", "timeout_secs")? {
        if timeout < 1 {
            return Err(VolscaleError::invalid(
                "data",
                "timeout_secs",
                "timeout_secs must be at least 1",
            ));
        }
    }
    Ok(())
}

/// Window lengths with defaults applied. Call after [`validate_config`].
pub fn indicator_params(config: &dyn ConfigPort) -> IndicatorParams {
    let defaults = IndicatorParams::default();
    let window = |key: &str, default: usize| {
        config.get_int("strategy", key, default as i64).max(1) as usize
    };
    IndicatorParams {
        ema_len: window("ema_len", defaults.ema_len),
        sma_len: window("sma_len", defaults.sma_len),
        atr_len: window("atr_len", defaults.atr_len),
        rsi_len: window("rsi_len", defaults.rsi_len),
    }
}

pub fn exposure_params(config: &dyn ConfigPort) -> Result<ExposureParams, VolscaleError> {
    let defaults = ExposureParams::default();
    ExposureParams::new(
        config.get_double("strategy", "target_atr_pct", defaults.target_atr_pct),
        config.get_double("strategy", "min_exposure", defaults.min_exposure),
        config.get_double("strategy", "max_exposure", defaults.max_exposure),
    )
}
