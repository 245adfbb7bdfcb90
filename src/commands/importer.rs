// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::arg;
use crate::ledger;
use crate::models::{Currency, NewPurchase, NewTransfer, PeriodUnit};
use crate::utils::{PERPETUAL_PERIOD, parse_amount, parse_date, parse_period};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{HashMap, hash_map::Entry};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub investors_created: usize,
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transfers", sub)) => {
            let path = arg(sub, "path")?.trim();
            let s = import_transfers(conn, Path::new(path))?;
            println!(
                "Imported transfers from {}: {} added, {} skipped, {} new investor(s)",
                path, s.inserted, s.skipped, s.investors_created
            );
        }
        Some(("services", sub)) => {
            let path = arg(sub, "path")?.trim();
            let s = import_services(conn, Path::new(path))?;
            println!(
                "Imported service purchases from {}: {} added, {} skipped",
                path, s.inserted, s.skipped
            );
        }
        _ => {}
    }
    Ok(())
}

fn field(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Columns: investor, amount, currency, date. Unknown investors are created
/// and rows already present as transfers are skipped.
pub fn import_transfers(conn: &mut Connection, path: &Path) -> Result<ImportSummary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();
    let mut investor_cache: HashMap<String, i64> = HashMap::new();

    for (i, result) in rdr.records().enumerate() {
        let row = i + 2;
        let rec = result.with_context(|| format!("Read row {}", row))?;
        let (Some(name), Some(amount_raw), Some(ccy_raw), Some(date_raw)) = (
            field(&rec, 0),
            field(&rec, 1),
            field(&rec, 2),
            field(&rec, 3),
        ) else {
            warn!(row, "skipping transfer row with blank fields");
            summary.skipped += 1;
            continue;
        };

        let amount = parse_amount(amount_raw).with_context(|| format!("Row {}", row))?;
        let currency = ccy_raw.parse::<Currency>().with_context(|| format!("Row {}", row))?;
        let date = parse_date(date_raw).with_context(|| format!("Row {}", row))?;

        let investor_id = match investor_cache.entry(name.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = match ledger::find_investor(&tx, name)? {
                    Some(inv) => inv.id,
                    None => {
                        summary.investors_created += 1;
                        ledger::add_investor(&tx, name)?.id
                    }
                };
                *entry.insert(id)
            }
        };

        let t = NewTransfer {
            investor_id,
            amount,
            currency,
            date,
        };
        if ledger::transfer_exists(&tx, &t)? {
            info!(row, investor = name, amount, %currency, %date, "duplicate transfer skipped");
            summary.skipped += 1;
            continue;
        }
        ledger::add_transfer(&tx, &t)?;
        summary.inserted += 1;
    }
    tx.commit()?;
    info!(?summary, "transfer import finished");
    Ok(summary)
}

/// Columns: service, amount, currency, date, period, unit. A perpetual period
/// without a unit is stored as years.
pub fn import_services(conn: &mut Connection, path: &Path) -> Result<ImportSummary> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();

    for (i, result) in rdr.records().enumerate() {
        let row = i + 2;
        let rec = result.with_context(|| format!("Read row {}", row))?;
        let (Some(service), Some(amount_raw), Some(ccy_raw), Some(date_raw), Some(period_raw)) = (
            field(&rec, 0),
            field(&rec, 1),
            field(&rec, 2),
            field(&rec, 3),
            field(&rec, 4),
        ) else {
            warn!(row, "skipping service row with blank fields");
            summary.skipped += 1;
            continue;
        };

        let period = parse_period(period_raw).with_context(|| format!("Row {}", row))?;
        let period_unit = match field(&rec, 5) {
            Some(u) => u.parse::<PeriodUnit>().with_context(|| format!("Row {}", row))?,
            None if period == PERPETUAL_PERIOD => PeriodUnit::Year,
            None => {
                warn!(row, "skipping service row without a period unit");
                summary.skipped += 1;
                continue;
            }
        };

        let p = NewPurchase {
            investor_id: None,
            service: service.to_string(),
            amount: parse_amount(amount_raw).with_context(|| format!("Row {}", row))?,
            currency: ccy_raw.parse::<Currency>().with_context(|| format!("Row {}", row))?,
            date: parse_date(date_raw).with_context(|| format!("Row {}", row))?,
            period,
            period_unit,
        };
        if ledger::service_purchase_exists(&tx, &p)? {
            info!(row, service, "duplicate service purchase skipped");
            summary.skipped += 1;
            continue;
        }
        ledger::add_purchase(&tx, &p)?;
        summary.inserted += 1;
    }
    tx.commit()?;
    info!(?summary, "service import finished");
    Ok(summary)
}
