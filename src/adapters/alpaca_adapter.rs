//! Alpaca market-data price adapter.
//!
//! Fetches split- and dividend-adjusted daily bars from the v2 stock bars
//! endpoint, following `next_page_token` until the window is exhausted.
//! One blocking client with a bounded timeout; no retries.

use crate::domain::error::VolscaleError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const KEY_ENV: &str = "ALPACA_API_KEY";
pub const SECRET_ENV: &str = "ALPACA_API_SECRET";

const PAGE_LIMIT: u32 = 10_000;

#[derive(Debug, Deserialize)]
struct BarsPage {
    bars: Option<Vec<AlpacaBar>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: DateTime<Utc>,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub key_id: String,
    pub secret: String,
}

impl Credentials {
    /// Both variables must be set and non-empty.
    pub fn from_env() -> Result<Self, VolscaleError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve [`KEY_ENV`] and [`SECRET_ENV`] through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, VolscaleError> {
        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| VolscaleError::MissingCredentials {
                    reason: format!("{name} is not set"),
                })
        };
        Ok(Credentials {
            key_id: read(KEY_ENV)?,
            secret: read(SECRET_ENV)?,
        })
    }
}

pub struct AlpacaAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    credentials: Credentials,
}

impl AlpacaAdapter {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, VolscaleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VolscaleError::Provider {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn bars_url(&self, symbol: &str) -> String {
        format!("{}/v2/stocks/{}/bars", self.base_url, symbol)
    }

    fn fetch_page(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        page_token: Option<&str>,
    ) -> Result<BarsPage, VolscaleError> {
        let mut query = vec![
            ("timeframe", "1Day".to_string()),
            ("adjustment", "all".to_string()),
            ("start", rfc3339_midnight(start_date)),
            ("end", rfc3339_midnight(end_date)),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        let resp = self
            .client
            .get(self.bars_url(symbol))
            .header("APCA-API-KEY-ID", &self.credentials.key_id)
            .header("APCA-API-SECRET-KEY", &self.credentials.secret)
            .query(&query)
            .send()
            .map_err(|e| VolscaleError::Provider {
                reason: if e.is_timeout() {
                    format!("request for {symbol} timed out")
                } else {
                    format!("request for {symbol} failed: {e}")
                },
            })?;

        let status = resp.status();
        let body = resp.text().map_err(|e| VolscaleError::Provider {
            reason: format!("failed to read response for {symbol}: {e}"),
        })?;
        if let Some(err) = status_error(status, symbol, &body) {
            return Err(err);
        }

        parse_page(&body)
    }
}

/// 401 means the key pair was rejected. 403 is also used for plan and feed
/// restrictions, so it stays a provider error carrying Alpaca's message.
fn status_error(status: reqwest::StatusCode, symbol: &str, body: &str) -> Option<VolscaleError> {
    if status.is_success() {
        return None;
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Some(VolscaleError::MissingCredentials {
            reason: format!("Alpaca rejected credentials (HTTP {status}): {}", body.trim()),
        });
    }
    Some(VolscaleError::Provider {
        reason: format!("HTTP {status} for {symbol}: {}", body.trim()),
    })
}

fn rfc3339_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}

fn parse_page(body: &str) -> Result<BarsPage, VolscaleError> {
    serde_json::from_str(body).map_err(|e| VolscaleError::Provider {
        reason: format!("unexpected bars response: {e}"),
    })
}

fn to_bar(symbol: &str, bar: AlpacaBar) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        // daily bars are stamped at New York midnight, which is the same
        // calendar day in UTC
        date: bar.t.date_naive(),
        open: bar.o,
        high: bar.h,
        low: bar.l,
        close: bar.c,
        volume: bar.v,
    }
}

impl DataPort for AlpacaAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, VolscaleError> {
        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(symbol, start_date, end_date, page_token.as_deref())?;
            let fetched = page.bars.unwrap_or_default();
            debug!(symbol, count = fetched.len(), "fetched bars page");
            bars.extend(fetched.into_iter().map(|b| to_bar(symbol, b)));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "bars": [
            {"t": "2024-01-02T05:00:00Z", "o": 492.44, "h": 492.95, "l": 475.95, "c": 481.68, "v": 41125400, "n": 503020, "vw": 482.1},
            {"t": "2024-01-03T05:00:00Z", "o": 474.85, "h": 481.84, "l": 473.2, "c": 475.69, "v": 32089600, "n": 401011, "vw": 476.9}
        ],
        "symbol": "NVDA",
        "next_page_token": "TlZEQXxEfDIwMjQtMDEtMDM="
    }"#;

    #[test]
    fn parses_bars_and_token() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("TlZEQXxEfDIwMjQtMDEtMDM="));

        let bars: Vec<OhlcvBar> = page
            .bars
            .unwrap()
            .into_iter()
            .map(|b| to_bar("NVDA", b))
            .collect();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 481.68);
        assert_eq!(bars[1].volume, 32_089_600.0);
        assert_eq!(bars[1].symbol, "NVDA");
    }

    #[test]
    fn null_bars_is_empty_last_page() {
        let page = parse_page(r#"{"bars": null, "symbol": "NVDA", "next_page_token": null}"#).unwrap();
        assert!(page.bars.is_none());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn garbage_is_provider_error() {
        assert!(matches!(
            parse_page("<html>oops</html>"),
            Err(VolscaleError::Provider { .. })
        ));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[(KEY_ENV, "AKID"), (SECRET_ENV, "shh")])).unwrap();
        assert_eq!(creds.key_id, "AKID");
        assert_eq!(creds.secret, "shh");
    }

    #[test]
    fn missing_key_is_missing_credentials() {
        let err = Credentials::from_lookup(lookup(&[(SECRET_ENV, "shh")])).unwrap_err();
        match err {
            VolscaleError::MissingCredentials { ref reason } => assert!(reason.contains(KEY_ENV)),
            ref other => panic!("expected MissingCredentials, got {other:?}"),
        }
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn blank_secret_is_missing_credentials() {
        let err = Credentials::from_lookup(lookup(&[(KEY_ENV, "AKID"), (SECRET_ENV, "  ")])).unwrap_err();
        assert!(
            matches!(err, VolscaleError::MissingCredentials { ref reason } if reason.contains(SECRET_ENV))
        );
    }

    #[test]
    fn unauthorized_is_credentials_error() {
        let err = status_error(reqwest::StatusCode::UNAUTHORIZED, "NVDA", "{\"message\":\"unauthorized.\"}");
        assert!(matches!(err, Some(VolscaleError::MissingCredentials { .. })));
    }

    #[test]
    fn forbidden_is_provider_error_with_message() {
        let body = r#"{"message":"subscription does not permit querying recent SIP data"}"#;
        match status_error(reqwest::StatusCode::FORBIDDEN, "NVDA", body) {
            Some(VolscaleError::Provider { reason }) => {
                assert!(reason.contains("403"));
                assert!(reason.contains("subscription does not permit"));
            }
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[test]
    fn success_is_not_an_error() {
        assert!(status_error(reqwest::StatusCode::OK, "NVDA", "{}").is_none());
    }

    #[test]
    fn window_bounds_are_utc_midnight() {
        assert_eq!(
            rfc3339_midnight(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            "2026-01-01T00:00:00Z"
        );
    }

    #[test]
    fn bars_url_trims_trailing_slash() {
        let adapter = AlpacaAdapter::new(
            "https://data.alpaca.markets/",
            Credentials {
                key_id: "k".into(),
                secret: "s".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            adapter.bars_url("NVDA"),
            "https://data.alpaca.markets/v2/stocks/NVDA/bars"
        );
    }
}
