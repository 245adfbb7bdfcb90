// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use std::fmt;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Errors raised by the ledger store, the rate resolver and the aggregation engine.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error(
        "No {from}->{to} rate recorded for {}. Record it first with `treasurer rate set {} {from} {to} <rate>`",
        .date.format("%d.%m.%Y"),
        .date
    )]
    RateNotFound {
        from: String,
        to: String,
        date: NaiveDate,
    },

    #[error("Rate fetch failed: {0}")]
    RateFetch(String),

    #[error("{}", join_failures(.0))]
    Aggregation(Vec<RecordFailure>),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("import error: {0}")]
    Import(#[from] csv::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Which table a failed record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Transfer,
    Purchase,
    ServicePurchase,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Transfer => "transfer",
            RecordKind::Purchase => "purchase",
            RecordKind::ServicePurchase => "service purchase",
        };
        f.write_str(s)
    }
}

/// One record that could not be converted during an aggregation.
#[derive(Debug)]
pub struct RecordFailure {
    pub kind: RecordKind,
    pub id: i64,
    pub amount: f64,
    pub currency: String,
    pub date: NaiveDate,
    pub cause: Box<LedgerError>,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conversion failed for {} #{} ({:.2} {} on {}): {}",
            self.kind, self.id, self.amount, self.currency, self.date, self.cause
        )
    }
}

fn join_failures(failures: &[RecordFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
