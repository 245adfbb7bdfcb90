// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::arg;
use crate::ledger;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let inv = ledger::add_investor(conn, arg(sub, "name")?)?;
            println!("Added investor '{}' (#{})", inv.name, inv.id);
        }
        Some(("list", sub)) => {
            let investors = ledger::list_investors(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &investors)? {
                let data = investors
                    .into_iter()
                    .map(|i| vec![i.id.to_string(), i.name])
                    .collect();
                println!("{}", pretty_table(&["ID", "Name"], data));
            }
        }
        Some(("rm", sub)) => {
            let inv = ledger::remove_investor(conn, arg(sub, "name")?)?;
            println!("Removed investor '{}'", inv.name);
        }
        _ => {}
    }
    Ok(())
}
