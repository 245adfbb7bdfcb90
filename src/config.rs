// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime settings stored in the `settings` table.

use crate::error::{LedgerError, LedgerResult};
use crate::models::Currency;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_ENV: &str = "TREASURER_API_KEY";
pub const DEFAULT_QUOTE_ENDPOINT: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const KEY_TARGET_CURRENCY: &str = "target_currency";
pub const KEY_RATE_MODE: &str = "rate_mode";
pub const KEY_QUOTE_ENDPOINT: &str = "quote_endpoint";
pub const KEY_QUOTE_TIMEOUT: &str = "quote_timeout_secs";

pub const KEYS: [&str; 4] = [
    KEY_TARGET_CURRENCY,
    KEY_RATE_MODE,
    KEY_QUOTE_ENDPOINT,
    KEY_QUOTE_TIMEOUT,
];

/// What the resolver does when no rate is stored for the exact date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    #[default]
    Strict,
    Auto,
}

impl fmt::Display for RateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RateMode::Strict => "strict",
            RateMode::Auto => "auto",
        })
    }
}

impl FromStr for RateMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(RateMode::Strict),
            "auto" | "auto-fetch" => Ok(RateMode::Auto),
            other => Err(LedgerError::Validation(format!(
                "Unknown rate mode '{}', expected strict or auto",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub target_currency: Currency,
    pub rate_mode: RateMode,
    pub quote_endpoint: String,
    pub quote_timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            target_currency: Currency::Rub,
            rate_mode: RateMode::Strict,
            quote_endpoint: DEFAULT_QUOTE_ENDPOINT.to_string(),
            quote_timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl AppConfig {
    pub fn load(conn: &Connection) -> LedgerResult<Self> {
        let mut cfg = AppConfig::default();
        if let Some(v) = get_setting(conn, KEY_TARGET_CURRENCY)? {
            cfg.target_currency = v.parse()?;
        }
        if let Some(v) = get_setting(conn, KEY_RATE_MODE)? {
            cfg.rate_mode = v.parse()?;
        }
        if let Some(v) = get_setting(conn, KEY_QUOTE_ENDPOINT)? {
            cfg.quote_endpoint = v;
        }
        if let Some(v) = get_setting(conn, KEY_QUOTE_TIMEOUT)? {
            cfg.quote_timeout_secs = parse_timeout(&v)?;
        }
        cfg.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
        Ok(cfg)
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(self.quote_timeout_secs)
    }
}

fn parse_timeout(v: &str) -> LedgerResult<u64> {
    match v.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LedgerError::Validation(format!(
            "Invalid timeout '{}', expected a positive number of seconds",
            v
        ))),
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> LedgerResult<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

/// Validates and stores one setting. Returns the normalized value written.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> LedgerResult<String> {
    let normalized = match key {
        KEY_TARGET_CURRENCY => value.parse::<Currency>()?.to_string(),
        KEY_RATE_MODE => value.parse::<RateMode>()?.to_string(),
        KEY_QUOTE_ENDPOINT => {
            let v = value.trim().trim_end_matches('/');
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(LedgerError::validation(format!(
                    "Invalid endpoint '{}', expected an http(s) URL",
                    value
                )));
            }
            v.to_string()
        }
        KEY_QUOTE_TIMEOUT => parse_timeout(value)?.to_string(),
        other => {
            return Err(LedgerError::Validation(format!(
                "Unknown setting '{}', expected one of {}",
                other,
                KEYS.join(", ")
            )));
        }
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, normalized],
    )?;
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn defaults_to_strict_rub() {
        let conn = open_in_memory().unwrap();
        let cfg = AppConfig::load(&conn).unwrap();
        assert_eq!(cfg.target_currency, Currency::Rub);
        assert_eq!(cfg.rate_mode, RateMode::Strict);
        assert_eq!(cfg.quote_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn settings_are_validated_and_normalized() {
        let conn = open_in_memory().unwrap();
        assert_eq!(set_setting(&conn, KEY_TARGET_CURRENCY, "usd").unwrap(), "USD");
        assert_eq!(set_setting(&conn, KEY_RATE_MODE, "AUTO").unwrap(), "auto");
        assert_eq!(
            set_setting(&conn, KEY_QUOTE_ENDPOINT, "https://example.test/v6/").unwrap(),
            "https://example.test/v6"
        );
        assert!(set_setting(&conn, KEY_QUOTE_TIMEOUT, "0").is_err());
        assert!(set_setting(&conn, "colour", "blue").is_err());

        let cfg = AppConfig::load(&conn).unwrap();
        assert_eq!(cfg.target_currency, Currency::Usd);
        assert_eq!(cfg.rate_mode, RateMode::Auto);
        assert_eq!(cfg.quote_endpoint, "https://example.test/v6");
    }
}
