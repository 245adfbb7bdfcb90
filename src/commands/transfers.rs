// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::arg;
use crate::ledger;
use crate::models::NewTransfer;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let investor = ledger::investor_by_name(conn, arg(sub, "investor")?)?;
    let t = NewTransfer {
        investor_id: investor.id,
        amount: parse_amount(arg(sub, "amount")?)?,
        currency: arg(sub, "currency")?.parse()?,
        date: parse_date(arg(sub, "date")?)?,
    };
    ledger::add_transfer(conn, &t)?;
    println!(
        "Recorded transfer of {} from '{}' on {}",
        fmt_money(t.amount, t.currency.code()),
        investor.name,
        t.date
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransferRow {
    pub id: i64,
    pub date: String,
    pub investor: String,
    pub amount: f64,
    pub currency: String,
}

pub fn query_rows(conn: &Connection, investor: Option<&str>) -> Result<Vec<TransferRow>> {
    let names: HashMap<i64, String> = ledger::list_investors(conn)?
        .into_iter()
        .map(|i| (i.id, i.name))
        .collect();
    let transfers = match investor {
        Some(name) => ledger::list_transfers_for(conn, ledger::investor_by_name(conn, name)?.id)?,
        None => ledger::list_transfers(conn)?,
    };
    Ok(transfers
        .into_iter()
        .map(|t| TransferRow {
            id: t.id,
            date: t.date.to_string(),
            investor: names.get(&t.investor_id).cloned().unwrap_or_default(),
            amount: t.amount,
            currency: t.currency.to_string(),
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let investor = sub.get_one::<String>("investor").map(|s| s.as_str());
    let data = query_rows(conn, investor)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.investor.clone(),
                    format!("{:.2}", r.amount),
                    r.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Investor", "Amount", "CCY"], rows)
        );
    }
    Ok(())
}
