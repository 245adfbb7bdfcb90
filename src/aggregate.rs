// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Totals in a single target currency.
//!
//! Every record is converted on its own date. A record whose rate cannot be
//! resolved is remembered and the walk goes on; the query fails afterwards with
//! all of them, and the partial sum is dropped.

use crate::error::{LedgerError, LedgerResult, RecordFailure, RecordKind};
use crate::ledger;
use crate::models::{Currency, Investor, SpendRecord, Transfer};
use crate::rates::RateResolver;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

/// One transfer as shown in an investor breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct TransferLine {
    pub transfer_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: Currency,
    pub rate: f64,
    #[serde(serialize_with = "serialize_money")]
    pub converted: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestorReport {
    pub investor: Investor,
    pub target: Currency,
    pub lines: Vec<TransferLine>,
    #[serde(serialize_with = "serialize_money")]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreasuryReport {
    pub target: Currency,
    #[serde(serialize_with = "serialize_money")]
    pub investments: f64,
    #[serde(serialize_with = "serialize_money")]
    pub purchases: f64,
    #[serde(serialize_with = "serialize_money")]
    pub balance: f64,
}

/// Rounds for presentation.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn serialize_money<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round2(*v))
}

struct Entry {
    kind: RecordKind,
    id: i64,
    amount: f64,
    currency: Currency,
    date: NaiveDate,
}

impl From<&Transfer> for Entry {
    fn from(t: &Transfer) -> Self {
        Entry {
            kind: RecordKind::Transfer,
            id: t.id,
            amount: t.amount,
            currency: t.currency,
            date: t.date,
        }
    }
}

impl From<&SpendRecord> for Entry {
    fn from(s: &SpendRecord) -> Self {
        let kind = match s {
            SpendRecord::Investor(_) => RecordKind::Purchase,
            SpendRecord::Group(_) => RecordKind::ServicePurchase,
        };
        Entry {
            kind,
            id: s.id(),
            amount: s.amount(),
            currency: s.currency(),
            date: s.date(),
        }
    }
}

#[derive(Default)]
struct Tally {
    total: f64,
    lines: Vec<TransferLine>,
    failures: Vec<RecordFailure>,
}

pub struct Aggregator<'a> {
    conn: &'a Connection,
    resolver: &'a RateResolver<'a>,
}

impl<'a> Aggregator<'a> {
    pub fn new(conn: &'a Connection, resolver: &'a RateResolver<'a>) -> Self {
        Self { conn, resolver }
    }

    fn walk(&self, entries: impl IntoIterator<Item = Entry>, target: Currency) -> Tally {
        let mut tally = Tally::default();
        for e in entries {
            match self
                .resolver
                .resolve(e.currency.code(), target.code(), e.date)
            {
                Ok(rate) => {
                    let converted = e.amount * rate;
                    debug!(kind = %e.kind, id = e.id, amount = e.amount, currency = %e.currency, rate, converted, "converted");
                    tally.total += converted;
                    tally.lines.push(TransferLine {
                        transfer_id: e.id,
                        date: e.date,
                        amount: e.amount,
                        currency: e.currency,
                        rate,
                        converted,
                    });
                }
                Err(cause) => {
                    warn!(kind = %e.kind, id = e.id, error = %cause, "conversion failed");
                    tally.failures.push(RecordFailure {
                        kind: e.kind,
                        id: e.id,
                        amount: e.amount,
                        currency: e.currency.to_string(),
                        date: e.date,
                        cause: Box::new(cause),
                    });
                }
            }
        }
        tally
    }

    fn settle(tally: Tally, what: &str, target: Currency) -> LedgerResult<Tally> {
        if tally.failures.is_empty() {
            info!(total = tally.total, %target, "{} computed", what);
            Ok(tally)
        } else {
            warn!(failures = tally.failures.len(), "{} failed", what);
            Err(LedgerError::Aggregation(tally.failures))
        }
    }

    fn purchases_tally(&self, target: Currency) -> LedgerResult<Tally> {
        let spend = ledger::list_spend(self.conn)?;
        debug!(records = spend.len(), "summing purchases");
        Ok(self.walk(spend.iter().map(Entry::from), target))
    }

    fn investments_tally(&self, target: Currency) -> LedgerResult<Tally> {
        let transfers = ledger::list_transfers(self.conn)?;
        debug!(records = transfers.len(), "summing investments");
        Ok(self.walk(transfers.iter().map(Entry::from), target))
    }

    /// Investor purchases and group service purchases.
    pub fn total_purchases(&self, target: Currency) -> LedgerResult<f64> {
        let tally = self.purchases_tally(target)?;
        Ok(Self::settle(tally, "total purchases", target)?.total)
    }

    pub fn total_investments(&self, target: Currency) -> LedgerResult<f64> {
        let tally = self.investments_tally(target)?;
        Ok(Self::settle(tally, "total investments", target)?.total)
    }

    pub fn investor_investments(
        &self,
        investor_id: i64,
        target: Currency,
    ) -> LedgerResult<InvestorReport> {
        let investor = ledger::investor_by_id(self.conn, investor_id)?;
        let transfers = ledger::list_transfers_for(self.conn, investor_id)?;
        debug!(investor = %investor.name, records = transfers.len(), "summing investor transfers");
        let tally = self.walk(transfers.iter().map(Entry::from), target);
        let tally = Self::settle(tally, "investor investments", target)?;
        Ok(InvestorReport {
            investor,
            target,
            lines: tally.lines,
            total: tally.total,
        })
    }

    /// Investments minus purchases. Failures from both sides are reported together.
    pub fn treasury_balance(&self, target: Currency) -> LedgerResult<TreasuryReport> {
        let mut investments = self.investments_tally(target)?;
        let purchases = self.purchases_tally(target)?;
        if !investments.failures.is_empty() || !purchases.failures.is_empty() {
            investments.failures.extend(purchases.failures);
            warn!(failures = investments.failures.len(), "treasury balance failed");
            return Err(LedgerError::Aggregation(investments.failures));
        }
        let balance = investments.total - purchases.total;
        info!(balance, %target, "treasury balance computed");
        Ok(TreasuryReport {
            target,
            investments: investments.total,
            purchases: purchases.total,
            balance,
        })
    }
}
