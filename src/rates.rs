// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exact-date rate resolution.
//!
//! A rate is either the one stored for the requested `(from, to, date)`, the
//! identity `1.0` for same-currency conversions, or an error. In
//! [`RateMode::Auto`] a miss is filled from the quote source and stored under
//! the requested date, so the stored value is the rate at fetch time.

use crate::config::RateMode;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger;
use crate::quotes::QuoteSource;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, info, warn};

type PairKey = (String, String, NaiveDate);

pub struct RateResolver<'a> {
    conn: &'a Connection,
    mode: RateMode,
    source: Option<&'a dyn QuoteSource>,
    /// Fetch failures are not retried for the life of the resolver.
    failed: RefCell<HashMap<PairKey, String>>,
}

impl<'a> RateResolver<'a> {
    pub fn new(conn: &'a Connection, mode: RateMode, source: Option<&'a dyn QuoteSource>) -> Self {
        Self {
            conn,
            mode,
            source,
            failed: RefCell::default(),
        }
    }

    pub fn strict(conn: &'a Connection) -> Self {
        Self {
            conn,
            mode: RateMode::Strict,
            source: None,
            failed: RefCell::default(),
        }
    }

    pub fn auto_fetch(conn: &'a Connection, source: &'a dyn QuoteSource) -> Self {
        Self {
            conn,
            mode: RateMode::Auto,
            source: Some(source),
            failed: RefCell::default(),
        }
    }

    pub fn mode(&self) -> RateMode {
        self.mode
    }

    pub fn resolve(&self, from: &str, to: &str, date: NaiveDate) -> LedgerResult<f64> {
        if from == to {
            return Ok(1.0);
        }
        if let Some(rate) = ledger::find_rate(self.conn, from, to, date)? {
            debug!(%date, %from, %to, rate, "stored rate");
            return Ok(rate);
        }
        match (self.mode, self.source) {
            (RateMode::Auto, Some(source)) => self.fetch_and_store(source, from, to, date),
            _ => {
                warn!(%date, %from, %to, "no rate recorded");
                Err(LedgerError::RateNotFound {
                    from: from.to_string(),
                    to: to.to_string(),
                    date,
                })
            }
        }
    }

    fn fetch_and_store(
        &self,
        source: &dyn QuoteSource,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> LedgerResult<f64> {
        let key = (from.to_string(), to.to_string(), date);
        if let Some(msg) = self.failed.borrow().get(&key) {
            debug!(%date, %from, %to, "fetch already failed, not retrying");
            return Err(LedgerError::RateFetch(msg.clone()));
        }
        let rate = match source.current_rate(from, to) {
            Ok(rate) => rate,
            Err(LedgerError::RateFetch(msg)) => {
                self.failed.borrow_mut().insert(key, msg.clone());
                return Err(LedgerError::RateFetch(msg));
            }
            Err(e) => return Err(e),
        };
        ledger::upsert_rate(self.conn, from, to, date, rate)?;
        info!(%date, %from, %to, rate, "fetched current rate stored for requested date");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use std::cell::Cell;

    struct CountingSource {
        rate: f64,
        calls: Cell<u32>,
    }

    impl QuoteSource for CountingSource {
        fn current_rate(&self, _from: &str, _to: &str) -> LedgerResult<f64> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.rate)
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn identity_needs_no_lookup() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        // no schema at all: any query would fail
        let r = RateResolver::strict(&conn);
        assert_eq!(r.resolve("EUR", "EUR", d(1999, 1, 1)).unwrap(), 1.0);
    }

    #[test]
    fn exact_date_only() {
        let conn = open_in_memory().unwrap();
        ledger::upsert_rate(&conn, "USD", "RUB", d(2024, 6, 1), 90.0).unwrap();
        let r = RateResolver::strict(&conn);
        assert_eq!(r.resolve("USD", "RUB", d(2024, 6, 1)).unwrap(), 90.0);
        let err = r.resolve("USD", "RUB", d(2024, 6, 2)).unwrap_err();
        assert!(matches!(err, LedgerError::RateNotFound { .. }));
    }

    #[test]
    fn auto_fetch_stores_under_requested_date() {
        let conn = open_in_memory().unwrap();
        let src = CountingSource {
            rate: 4.0,
            calls: Cell::new(0),
        };
        let r = RateResolver::auto_fetch(&conn, &src);
        assert_eq!(r.resolve("TRY", "RUB", d(2023, 3, 8)).unwrap(), 4.0);
        assert_eq!(r.resolve("TRY", "RUB", d(2023, 3, 8)).unwrap(), 4.0);
        assert_eq!(src.calls.get(), 1);
        assert_eq!(r.resolve("RUB", "TRY", d(2023, 3, 8)).unwrap(), 0.25);
    }

    struct DownSource {
        calls: Cell<u32>,
    }

    impl QuoteSource for DownSource {
        fn current_rate(&self, _from: &str, _to: &str) -> LedgerResult<f64> {
            self.calls.set(self.calls.get() + 1);
            Err(LedgerError::RateFetch("connection refused".into()))
        }
    }

    #[test]
    fn failed_fetch_is_not_repeated_for_same_pair_and_date() {
        let conn = open_in_memory().unwrap();
        let src = DownSource {
            calls: Cell::new(0),
        };
        let r = RateResolver::auto_fetch(&conn, &src);
        for _ in 0..3 {
            let err = r.resolve("USD", "RUB", d(2024, 6, 1)).unwrap_err();
            assert!(matches!(err, LedgerError::RateFetch(ref m) if m == "connection refused"));
        }
        assert_eq!(src.calls.get(), 1);
        assert!(r.resolve("USD", "RUB", d(2024, 6, 2)).is_err());
        assert_eq!(src.calls.get(), 2);
    }
}
