// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use std::cell::RefCell;
use treasurer::aggregate::Aggregator;
use treasurer::error::{LedgerError, LedgerResult};
use treasurer::ledger;
use treasurer::models::{Currency, NewTransfer};
use treasurer::quotes::QuoteSource;
use treasurer::rates::RateResolver;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct FixedQuotes {
    rate: f64,
    asked: RefCell<Vec<(String, String)>>,
}

impl QuoteSource for FixedQuotes {
    fn current_rate(&self, from: &str, to: &str) -> LedgerResult<f64> {
        self.asked.borrow_mut().push((from.to_string(), to.to_string()));
        Ok(self.rate)
    }
}

struct DownQuotes;

impl QuoteSource for DownQuotes {
    fn current_rate(&self, _from: &str, _to: &str) -> LedgerResult<f64> {
        Err(LedgerError::RateFetch("quote service answered 503".into()))
    }
}

#[test]
fn same_currency_is_identity_for_any_date() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let r = RateResolver::strict(&conn);
    for c in Currency::ALL {
        assert_eq!(r.resolve(c.code(), c.code(), d(2001, 2, 3)).unwrap(), 1.0);
    }
}

#[test]
fn recording_a_rate_makes_the_inverse_available() {
    let conn = treasurer::db::open_in_memory().unwrap();
    ledger::upsert_rate(&conn, "INR", "RUB", d(2024, 6, 13), 1.0022).unwrap();
    let r = RateResolver::strict(&conn);
    assert_eq!(r.resolve("RUB", "INR", d(2024, 6, 13)).unwrap(), 1.0 / 1.0022);
}

#[test]
fn upsert_keeps_one_row_per_natural_key() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let day = d(2024, 12, 4);
    ledger::upsert_rate(&conn, "USD", "RUB", day, 100.0).unwrap();
    ledger::upsert_rate(&conn, "RUB", "USD", day, 0.02).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM exchange_rates WHERE date=?1",
            [day.to_string()],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);
    let r = RateResolver::strict(&conn);
    assert_eq!(r.resolve("RUB", "USD", day).unwrap(), 0.02);
    assert_eq!(r.resolve("USD", "RUB", day).unwrap(), 50.0);
}

#[test]
fn ad_hoc_codes_are_allowed_on_rates() {
    let conn = treasurer::db::open_in_memory().unwrap();
    ledger::upsert_rate(&conn, "gbp", "usd", d(2024, 1, 1), 1.25).unwrap();
    let rates = ledger::list_rates(&conn, 10).unwrap();
    assert_eq!(rates.len(), 2);
    assert!(rates.iter().any(|r| r.from_currency == "GBP" && r.to_currency == "USD"));
}

#[test]
fn strict_mode_never_fetches() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let quotes = FixedQuotes {
        rate: 2.0,
        asked: RefCell::new(Vec::new()),
    };
    let r = RateResolver::new(
        &conn,
        treasurer::config::RateMode::Strict,
        Some(&quotes as &dyn QuoteSource),
    );
    let err = r.resolve("EUR", "RUB", d(2024, 6, 1)).unwrap_err();
    assert!(matches!(err, LedgerError::RateNotFound { .. }));
    assert!(quotes.asked.borrow().is_empty());
}

#[test]
fn auto_fetch_persists_pair_under_requested_date() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let ann = ledger::add_investor(&conn, "Ann").unwrap();
    ledger::add_transfer(
        &conn,
        &NewTransfer {
            investor_id: ann.id,
            amount: 100.0,
            currency: Currency::Usd,
            date: d(2023, 1, 15),
        },
    )
    .unwrap();
    let quotes = FixedQuotes {
        rate: 92.5,
        asked: RefCell::new(Vec::new()),
    };
    let r = RateResolver::auto_fetch(&conn, &quotes);
    let engine = Aggregator::new(&conn, &r);
    let total = engine.total_investments(Currency::Rub).unwrap();
    assert_eq!(format!("{:.2}", total), "9250.00");
    assert_eq!(
        quotes.asked.borrow().as_slice(),
        &[("USD".to_string(), "RUB".to_string())]
    );
    assert_eq!(
        ledger::find_rate(&conn, "USD", "RUB", d(2023, 1, 15)).unwrap(),
        Some(92.5)
    );
    assert_eq!(
        ledger::find_rate(&conn, "RUB", "USD", d(2023, 1, 15)).unwrap(),
        Some(1.0 / 92.5)
    );
}

#[test]
fn fetch_failure_is_distinct_from_missing_rate() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let r = RateResolver::auto_fetch(&conn, &DownQuotes);
    let err = r.resolve("EUR", "RUB", d(2024, 6, 1)).unwrap_err();
    assert!(matches!(err, LedgerError::RateFetch(_)));
    assert!(err.to_string().contains("503"));
    assert!(ledger::list_rates(&conn, 10).unwrap().is_empty());
}
