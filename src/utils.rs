// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

const UA: &str = concat!(
    "treasurer/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/treasurer)"
);

/// Period stored for subscriptions bought without an end date.
pub const PERPETUAL_PERIOD: u32 = 999_999;

static RATE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("static regex"));

pub fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// Accepts `YYYY-MM-DD` and `DD.MM.YYYY`.
pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| {
            LedgerError::Validation(format!(
                "Invalid date '{}', expected YYYY-MM-DD or DD.MM.YYYY",
                s
            ))
        })
}

/// Parses a strictly positive amount. Spaces are thousands separators and
/// a comma may be used as the decimal point.
pub fn parse_amount(s: &str) -> LedgerResult<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let v: f64 = cleaned
        .parse()
        .map_err(|_| LedgerError::Validation(format!("Invalid amount '{}'", s.trim())))?;
    ensure_positive(v, "Amount")
}

pub fn ensure_positive(v: f64, what: &str) -> LedgerResult<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(LedgerError::Validation(format!(
            "{} must be a positive number, got {}",
            what, v
        )))
    }
}

pub fn parse_period(s: &str) -> LedgerResult<u32> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("unlimited") || s.to_lowercase() == "бессрочно" {
        return Ok(PERPETUAL_PERIOD);
    }
    match s.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LedgerError::Validation(format!(
            "Invalid period '{}', expected a positive whole number",
            s
        ))),
    }
}

/// Normalizes a free-form currency code used on exchange rates.
pub fn parse_rate_code(s: &str) -> LedgerResult<String> {
    let code = s.trim().to_uppercase();
    if RATE_CODE.is_match(&code) {
        Ok(code)
    } else {
        Err(LedgerError::Validation(format!(
            "Invalid currency code '{}', expected three letters",
            s.trim()
        )))
    }
}

pub fn fmt_money(v: f64, ccy: &str) -> String {
    format!("{:.2} {}", v, ccy)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_in_both_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
        assert_eq!(parse_date("2024-06-13").unwrap(), d);
        assert_eq!(parse_date(" 13.06.2024 ").unwrap(), d);
        assert!(parse_date("2024/06/13").is_err());
    }

    #[test]
    fn amounts_with_separators() {
        assert_eq!(parse_amount("1 000,50").unwrap(), 1000.5);
        assert_eq!(parse_amount("42").unwrap(), 42.0);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn perpetual_period() {
        assert_eq!(parse_period("Unlimited").unwrap(), PERPETUAL_PERIOD);
        assert_eq!(parse_period("бессрочно").unwrap(), PERPETUAL_PERIOD);
        assert_eq!(parse_period("3").unwrap(), 3);
        assert!(parse_period("0").is_err());
    }

    #[test]
    fn rate_codes() {
        assert_eq!(parse_rate_code(" gbp").unwrap(), "GBP");
        assert!(parse_rate_code("US").is_err());
        assert!(parse_rate_code("U5D").is_err());
    }
}
