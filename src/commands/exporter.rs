// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transfers::query_rows;
use crate::cli::arg;
use crate::ledger;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((what, sub)) = m.subcommand() else {
        return Ok(());
    };
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = Path::new(arg(sub, "out")?);
    let n = match what {
        "transfers" => export_transfers(conn, &fmt, out)?,
        "services" => export_services(conn, &fmt, out)?,
        _ => return Ok(()),
    };
    println!("Exported {} {} to {}", n, what, out.display());
    Ok(())
}

/// Same columns as `import transfers`, so the file can be imported back.
pub fn export_transfers(conn: &Connection, fmt: &str, out: &Path) -> Result<usize> {
    let rows = query_rows(conn, None)?;
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["investor", "amount", "currency", "date"])?;
            for r in &rows {
                wtr.write_record([
                    r.investor.clone(),
                    r.amount.to_string(),
                    r.currency.clone(),
                    r.date.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "investor": r.investor, "amount": r.amount, "currency": r.currency, "date": r.date
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(rows.len())
}

/// Same columns as `import services`.
pub fn export_services(conn: &Connection, fmt: &str, out: &Path) -> Result<usize> {
    let items = ledger::list_service_purchases(conn)?;
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["service", "amount", "currency", "date", "period", "unit"])?;
            for p in &items {
                wtr.write_record([
                    p.service.clone(),
                    p.amount.to_string(),
                    p.currency.to_string(),
                    p.date.to_string(),
                    p.period.to_string(),
                    p.period_unit.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = items
                .iter()
                .map(|p| {
                    json!({
                        "service": p.service, "amount": p.amount, "currency": p.currency,
                        "date": p.date, "period": p.period, "unit": p.period_unit
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(items.len())
}
