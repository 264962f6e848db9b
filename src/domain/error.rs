//! Domain error types.
//!
//! Numeric degeneracies (zero close, zero volatility, zero peak) are not
//! errors: each stage resolves them to a fixed fallback value.

/// Top-level error type for volscale.
#[derive(Debug, thiserror::Error)]
pub enum VolscaleError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("missing or rejected credentials: {reason}")]
    MissingCredentials { reason: String },

    #[error("price provider error: {reason}")]
    Provider { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VolscaleError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        VolscaleError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        VolscaleError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            VolscaleError::Io(_) => 1,
            VolscaleError::ConfigParse { .. }
            | VolscaleError::ConfigMissing { .. }
            | VolscaleError::ConfigInvalid { .. }
            | VolscaleError::MissingCredentials { .. } => 2,
            VolscaleError::Provider { .. } => 3,
            VolscaleError::NoData { .. } | VolscaleError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&VolscaleError> for std::process::ExitCode {
    fn from(err: &VolscaleError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = VolscaleError::InsufficientData {
            symbol: "NVDA".into(),
            bars: 12,
            minimum: 51,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for NVDA: have 12 bars, need 51"
        );
    }

    #[test]
    fn config_invalid_message() {
        let err = VolscaleError::invalid("strategy", "ema_len", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] ema_len: must be positive"
        );
    }

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(VolscaleError::missing("backtest", "symbol").exit_code(), 2);
        assert_eq!(
            VolscaleError::MissingCredentials { reason: "unset".into() }.exit_code(),
            2
        );
        assert_eq!(VolscaleError::Provider { reason: "503".into() }.exit_code(), 3);
        assert_eq!(VolscaleError::NoData { symbol: "NVDA".into() }.exit_code(), 5);
        assert_eq!(
            VolscaleError::Io(std::io::Error::other("disk full")).exit_code(),
            1
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: VolscaleError = io.into();
        assert!(matches!(err, VolscaleError::Io(_)));
    }
}
