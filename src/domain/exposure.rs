//! Exposure model: trend signal times volatility-normalised weight.
//!
//! Pure per-day transform. `signal` is 1 while the fast EMA is strictly above
//! the slow SMA. `weight` scales toward a target daily ATR fraction and is
//! clipped into `[min_exposure, max_exposure]`.

use crate::domain::error::VolscaleError;
use crate::domain::indicator::IndicatorRecord;

/// Sizing parameters. `min_exposure <= max_exposure` is expected; build with
/// [`ExposureParams::new`] to have it checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureParams {
    pub target_atr_pct: f64,
    pub min_exposure: f64,
    pub max_exposure: f64,
}

impl Default for ExposureParams {
    fn default() -> Self {
        ExposureParams {
            target_atr_pct: 0.02,
            min_exposure: 0.0,
            max_exposure: 1.0,
        }
    }
}

impl ExposureParams {
    pub fn new(
        target_atr_pct: f64,
        min_exposure: f64,
        max_exposure: f64,
    ) -> Result<Self, VolscaleError> {
        if !target_atr_pct.is_finite() || target_atr_pct <= 0.0 {
            return Err(VolscaleError::invalid(
                "strategy",
                "target_atr_pct",
                "target_atr_pct must be positive",
            ));
        }
        if !min_exposure.is_finite() || min_exposure < 0.0 {
            return Err(VolscaleError::invalid(
                "strategy",
                "min_exposure",
                "min_exposure must be non-negative",
            ));
        }
        if !max_exposure.is_finite() {
            return Err(VolscaleError::invalid(
                "strategy",
                "max_exposure",
                "max_exposure must be finite",
            ));
        }
        if min_exposure > max_exposure {
            return Err(VolscaleError::invalid(
                "strategy",
                "min_exposure",
                "min_exposure must not exceed max_exposure",
            ));
        }
        Ok(ExposureParams {
            target_atr_pct,
            min_exposure,
            max_exposure,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub indicators: IndicatorRecord,
    pub signal: f64,
    pub raw_weight: f64,
    pub weight: f64,
    pub position: f64,
}

impl PositionRecord {
    pub fn close(&self) -> f64 {
        self.indicators.bar.close
    }
}

pub fn trend_signal(ema_fast: f64, sma_slow: f64) -> f64 {
    if ema_fast > sma_slow { 1.0 } else { 0.0 }
}

/// `target / atr_pct`. Zero volatility maps to `+inf`; an undefined
/// `atr_pct` (zero close) maps to `0.0` so it clips to the minimum.
pub fn raw_weight(atr_pct: Option<f64>, target_atr_pct: f64) -> f64 {
    match atr_pct {
        Some(v) if v == 0.0 => f64::INFINITY,
        Some(v) if v.is_finite() && v > 0.0 => target_atr_pct / v,
        _ => 0.0,
    }
}

/// Clip into `[min_exposure, max_exposure]`; NaN goes to the minimum. Never
/// panics: inverted bounds resolve to `max_exposure`.
pub fn clip_weight(raw: f64, params: &ExposureParams) -> f64 {
    if raw.is_nan() {
        return params.min_exposure;
    }
    raw.max(params.min_exposure).min(params.max_exposure)
}

pub fn size_position(record: &IndicatorRecord, params: &ExposureParams) -> PositionRecord {
    let signal = trend_signal(record.ema_fast, record.sma_slow);
    let raw = raw_weight(record.atr_pct, params.target_atr_pct);
    let weight = clip_weight(raw, params);

    PositionRecord {
        indicators: record.clone(),
        signal,
        raw_weight: raw,
        weight,
        position: signal * weight,
    }
}

pub fn size_positions(records: &[IndicatorRecord], params: &ExposureParams) -> Vec<PositionRecord> {
    records.iter().map(|r| size_position(r, params)).collect()
}
