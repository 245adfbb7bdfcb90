// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::arg;
use crate::dialog::{Completed, Dialog, DialogKind, Step};
use crate::ledger;
use crate::models::{NewPurchase, NewTransfer};
use crate::utils::fmt_money;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::io::{BufRead, Write};
use tracing::debug;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind = arg(sub, "kind")?
        .parse::<DialogKind>()
        .map_err(|e| anyhow!(e))?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    run(conn, kind, stdin.lock(), &mut stdout)?;
    Ok(())
}

/// Runs one dialog to completion. Returns `false` when it was cancelled and
/// an error when the completed entry could not be stored.
pub fn run<R: BufRead, W: Write>(
    conn: &Connection,
    kind: DialogKind,
    mut input: R,
    out: &mut W,
) -> Result<bool> {
    let mut dialog = Dialog::new(kind);
    if kind == DialogKind::Transfer || kind == DialogKind::Purchase {
        let names: Vec<String> = ledger::list_investors(conn)?
            .into_iter()
            .map(|i| i.name)
            .collect();
        if names.is_empty() {
            writeln!(out, "No investors yet; add one first.")?;
            return Ok(false);
        }
        let numbered: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{}. {}", i + 1, n))
            .collect();
        writeln!(out, "Investors: {}", numbered.join(", "))?;
        dialog = Dialog::with_investors(kind, names);
    }
    writeln!(out, "(type 'cancel' to abort)")?;
    if let Some(p) = dialog.prompt() {
        writeln!(out, "{}", p)?;
    }

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            dialog.cancel();
            writeln!(out, "Cancelled, nothing saved.")?;
            return Ok(false);
        }
        match dialog.feed(&line) {
            Step::Prompt(p) => writeln!(out, "{}", p)?,
            Step::Retry { error, prompt } => writeln!(out, "{}\n{}", error, prompt)?,
            Step::Cancelled => {
                writeln!(out, "Cancelled, nothing saved.")?;
                return Ok(false);
            }
            Step::Done(done) => {
                debug!(?done, "dialog completed");
                match save(conn, done) {
                    Ok(msg) => {
                        writeln!(out, "{}", msg)?;
                        return Ok(true);
                    }
                    Err(e) => {
                        writeln!(out, "Nothing saved: {:#}", e)?;
                        return Err(e.context("Entry was not saved"));
                    }
                }
            }
        }
    }
}

fn save(conn: &Connection, done: Completed) -> Result<String> {
    let msg = match done {
        Completed::Investor { name } => {
            let inv = ledger::add_investor(conn, &name)?;
            format!("Investor '{}' added.", inv.name)
        }
        Completed::Transfer {
            investor,
            amount,
            currency,
            date,
        } => {
            let inv = ledger::investor_by_name(conn, &investor)?;
            ledger::add_transfer(
                conn,
                &NewTransfer {
                    investor_id: inv.id,
                    amount,
                    currency,
                    date,
                },
            )?;
            format!(
                "Transfer of {} from '{}' on {} added.",
                fmt_money(amount, currency.code()),
                inv.name,
                date
            )
        }
        Completed::Purchase {
            investor,
            service,
            amount,
            currency,
            date,
            period,
            unit,
        } => {
            let investor_id = match &investor {
                Some(name) => Some(ledger::investor_by_name(conn, name)?.id),
                None => None,
            };
            ledger::add_purchase(
                conn,
                &NewPurchase {
                    investor_id,
                    service: service.clone(),
                    amount,
                    currency,
                    date,
                    period,
                    period_unit: unit,
                },
            )?;
            format!(
                "Purchase '{}' of {} on {} added.",
                service,
                fmt_money(amount, currency.code()),
                date
            )
        }
        Completed::Rate {
            date,
            from,
            to,
            rate,
        } => {
            let inverse = ledger::upsert_rate(conn, &from, &to, date, rate)?;
            format!(
                "Rate for {}: 1 {} = {} {}; inverse 1 {} = {:.4} {}.",
                date.format("%d.%m.%Y"),
                from,
                rate,
                to,
                to,
                inverse,
                from
            )
        }
    };
    Ok(msg)
}
