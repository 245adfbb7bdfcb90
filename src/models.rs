// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies accepted on transfers and purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Rub,
    Uah,
    Inr,
    Try,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Rub,
        Currency::Uah,
        Currency::Inr,
        Currency::Try,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Rub => "RUB",
            Currency::Uah => "UAH",
            Currency::Inr => "INR",
            Currency::Try => "TRY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| {
                let known: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
                LedgerError::Validation(format!(
                    "Unknown currency '{}', expected one of {}",
                    s.trim(),
                    known.join(", ")
                ))
            })
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Unit of a purchase's recurrence period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    pub const ALL: [PeriodUnit; 3] = [PeriodUnit::Week, PeriodUnit::Month, PeriodUnit::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodUnit::Week => "week",
            PeriodUnit::Month => "month",
            PeriodUnit::Year => "year",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodUnit {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weeks" | "w" => Ok(PeriodUnit::Week),
            "month" | "months" | "m" => Ok(PeriodUnit::Month),
            "year" | "years" | "y" => Ok(PeriodUnit::Year),
            other => Err(LedgerError::Validation(format!(
                "Unknown period unit '{}', expected week, month or year",
                other
            ))),
        }
    }
}

impl ToSql for PeriodUnit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PeriodUnit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub investor_id: i64,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub investor_id: i64,
    pub service: String,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
    pub period: u32,
    pub period_unit: PeriodUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePurchase {
    pub id: i64,
    pub service: String,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
    pub period: u32,
    pub period_unit: PeriodUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64, // 1 from_currency = rate to_currency
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Field values for a transfer that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub investor_id: i64,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
}

/// Field values for a purchase; `investor_id` is `None` for group spend.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    pub investor_id: Option<i64>,
    pub service: String,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
    pub period: u32,
    pub period_unit: PeriodUnit,
}

/// Any record that counts towards total purchases.
#[derive(Debug, Clone)]
pub enum SpendRecord {
    Investor(Purchase),
    Group(ServicePurchase),
}

impl SpendRecord {
    pub fn id(&self) -> i64 {
        match self {
            SpendRecord::Investor(p) => p.id,
            SpendRecord::Group(p) => p.id,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            SpendRecord::Investor(p) => p.amount,
            SpendRecord::Group(p) => p.amount,
        }
    }

    pub fn currency(&self) -> Currency {
        match self {
            SpendRecord::Investor(p) => p.currency,
            SpendRecord::Group(p) => p.currency,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            SpendRecord::Investor(p) => p.date,
            SpendRecord::Group(p) => p.date,
        }
    }
}
