// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::target_currency;
use crate::aggregate::round2;
use crate::config::AppConfig;
use crate::ledger;
use crate::models::Currency;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    MissingRate {
        date: NaiveDate,
        from: Currency,
        to: Currency,
    },
    DuplicateTransfer {
        investor: String,
        amount: f64,
        currency: String,
        date: String,
        copies: i64,
    },
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cfg = AppConfig::load(conn)?;
    let target = target_currency(&cfg, sub)?;
    let issues = find_issues(conn, target)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
        return Ok(());
    }
    let rows = issues
        .into_iter()
        .map(|i| match i {
            Issue::MissingRate { date, from, to } => vec![
                "missing_rate".to_string(),
                format!("{} {}->{}", date, from, to),
            ],
            Issue::DuplicateTransfer {
                investor,
                amount,
                currency,
                date,
                copies,
            } => vec![
                "duplicate_transfer".to_string(),
                format!("{} x{}: {} {} on {}", investor, copies, amount, currency, date),
            ],
        })
        .collect();
    println!("{}", pretty_table(&["Issue", "Detail"], rows));
    Ok(())
}

/// Exact-date rates into `target` that reports would miss, plus transfers
/// recorded more than once.
pub fn find_issues(conn: &Connection, target: Currency) -> Result<Vec<Issue>> {
    let mut needed: BTreeSet<(NaiveDate, Currency)> = BTreeSet::new();
    for t in ledger::list_transfers(conn)? {
        needed.insert((t.date, t.currency));
    }
    for s in ledger::list_spend(conn)? {
        needed.insert((s.date(), s.currency()));
    }

    let mut issues = Vec::new();
    for (date, from) in needed {
        if from == target {
            continue;
        }
        if ledger::find_rate(conn, from.code(), target.code(), date)?.is_none() {
            issues.push(Issue::MissingRate {
                date,
                from,
                to: target,
            });
        }
    }

    let mut stmt = conn.prepare(
        "SELECT i.name, t.amount, t.currency, t.date, COUNT(*) AS n
         FROM transfers t JOIN investors i ON i.id=t.investor_id
         GROUP BY t.investor_id, t.amount, t.currency, t.date
         HAVING n > 1
         ORDER BY t.date",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let amount: f64 = r.get(1)?;
        issues.push(Issue::DuplicateTransfer {
            investor: r.get(0)?,
            amount: round2(amount),
            currency: r.get(2)?,
            date: r.get(3)?,
            copies: r.get(4)?,
        });
    }
    Ok(issues)
}
