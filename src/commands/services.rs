// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::purchases::{fmt_period, purchase_from_args};
use crate::ledger;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let p = purchase_from_args(sub, None)?;
            ledger::add_purchase(conn, &p)?;
            println!(
                "Recorded service purchase '{}': {} on {} ({})",
                p.service,
                fmt_money(p.amount, p.currency.code()),
                p.date,
                fmt_period(p.period, p.period_unit)
            );
        }
        Some(("list", sub)) => {
            let items = ledger::list_service_purchases(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &items)? {
                let rows = items
                    .into_iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.date.to_string(),
                            p.service,
                            format!("{:.2}", p.amount),
                            p.currency.to_string(),
                            fmt_period(p.period, p.period_unit),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Date", "Service", "Amount", "CCY", "Period"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
