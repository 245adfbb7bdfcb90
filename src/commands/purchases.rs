// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::arg;
use crate::ledger;
use crate::models::NewPurchase;
use crate::utils::{
    PERPETUAL_PERIOD, fmt_money, maybe_print_json, parse_amount, parse_date, parse_period,
    pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let investor = ledger::investor_by_name(conn, arg(sub, "investor")?)?;
            let p = purchase_from_args(sub, Some(investor.id))?;
            ledger::add_purchase(conn, &p)?;
            println!(
                "Recorded purchase '{}' by '{}': {} on {}",
                p.service,
                investor.name,
                fmt_money(p.amount, p.currency.code()),
                p.date
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub(crate) fn purchase_from_args(
    sub: &clap::ArgMatches,
    investor_id: Option<i64>,
) -> Result<NewPurchase> {
    Ok(NewPurchase {
        investor_id,
        service: arg(sub, "service")?.trim().to_string(),
        amount: parse_amount(arg(sub, "amount")?)?,
        currency: arg(sub, "currency")?.parse()?,
        date: parse_date(arg(sub, "date")?)?,
        period: parse_period(arg(sub, "period")?)?,
        period_unit: arg(sub, "unit")?.parse()?,
    })
}

pub(crate) fn fmt_period(period: u32, unit: impl std::fmt::Display) -> String {
    if period == PERPETUAL_PERIOD {
        "unlimited".to_string()
    } else {
        format!("{} {}", period, unit)
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let purchases = ledger::list_purchases(conn)?;
    if maybe_print_json(sub.get_flag("json"), &purchases)? {
        return Ok(());
    }
    let names: HashMap<i64, String> = ledger::list_investors(conn)?
        .into_iter()
        .map(|i| (i.id, i.name))
        .collect();
    let rows = purchases
        .into_iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.date.to_string(),
                names.get(&p.investor_id).cloned().unwrap_or_default(),
                p.service,
                format!("{:.2}", p.amount),
                p.currency.to_string(),
                fmt_period(p.period, p.period_unit),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Investor", "Service", "Amount", "CCY", "Period"],
            rows
        )
    );
    Ok(())
}
