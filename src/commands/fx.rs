// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::quote_source;
use crate::cli::arg;
use crate::config::AppConfig;
use crate::ledger;
use crate::quotes::QuoteSource;
use crate::rates::RateResolver;
use crate::utils::{maybe_print_json, parse_amount, parse_date, parse_rate_code, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set_rate(conn, sub)?,
        Some(("get", sub)) => get_rate(conn, sub)?,
        Some(("list", sub)) => list_rates(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set_rate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(arg(sub, "date")?)?;
    let from = parse_rate_code(arg(sub, "from")?)?;
    let to = parse_rate_code(arg(sub, "to")?)?;
    let rate = parse_amount(arg(sub, "rate")?)?;
    let inverse = ledger::upsert_rate(conn, &from, &to, date, rate)?;
    println!("Rate recorded for {}", date.format("%d.%m.%Y"));
    println!("  1 {} = {} {}", from, rate, to);
    println!("  1 {} = {:.4} {}", to, inverse, from);
    Ok(())
}

fn get_rate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(arg(sub, "date")?)?;
    let from = parse_rate_code(arg(sub, "from")?)?;
    let to = parse_rate_code(arg(sub, "to")?)?;
    let cfg = AppConfig::load(conn)?;
    let source = quote_source(&cfg)?;
    let resolver = RateResolver::new(
        conn,
        cfg.rate_mode,
        source.as_ref().map(|s| s as &dyn QuoteSource),
    );
    let rate = resolver.resolve(&from, &to, date)?;
    println!("{}: 1 {} = {:.4} {}", date, from, rate, to);
    Ok(())
}

fn list_rates(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let limit = *sub.get_one::<usize>("limit").unwrap_or(&50);
    let rates = ledger::list_rates(conn, limit)?;
    if !maybe_print_json(sub.get_flag("json"), &rates)? {
        let data = rates
            .into_iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    r.from_currency,
                    r.to_currency,
                    format!("{:.6}", r.rate),
                    r.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "From", "To", "Rate", "Recorded"], data)
        );
    }
    Ok(())
}
