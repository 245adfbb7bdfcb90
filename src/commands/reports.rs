// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{quote_source, target_currency};
use crate::aggregate::{Aggregator, InvestorReport, round2};
use crate::cli::arg;
use crate::config::AppConfig;
use crate::ledger;
use crate::quotes::QuoteSource;
use crate::rates::RateResolver;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let cfg = AppConfig::load(conn)?;
    let target = target_currency(&cfg, sub)?;
    let json_flag = sub.get_flag("json");
    let source = quote_source(&cfg)?;
    let resolver = RateResolver::new(
        conn,
        cfg.rate_mode,
        source.as_ref().map(|s| s as &dyn QuoteSource),
    );
    let engine = Aggregator::new(conn, &resolver);

    match name {
        "purchases" => {
            let total = engine
                .total_purchases(target)
                .context("Could not compute total purchases")?;
            if !maybe_print_json(json_flag, &json!({ "currency": target, "total": round2(total) }))? {
                println!("Total purchases: {}", fmt_money(total, target.code()));
            }
        }
        "investments" => {
            let total = engine
                .total_investments(target)
                .context("Could not compute total investments")?;
            if !maybe_print_json(json_flag, &json!({ "currency": target, "total": round2(total) }))? {
                println!("Total investments: {}", fmt_money(total, target.code()));
            }
        }
        "treasury" => {
            let report = engine
                .treasury_balance(target)
                .context("Could not compute treasury balance")?;
            if !maybe_print_json(json_flag, &report)? {
                let rows = vec![
                    vec!["Investments".to_string(), format!("{:.2}", report.investments)],
                    vec!["Purchases".to_string(), format!("{:.2}", report.purchases)],
                    vec!["Balance".to_string(), format!("{:.2}", report.balance)],
                ];
                println!("{}", pretty_table(&["Treasury", target.code()], rows));
            }
        }
        "investor" => {
            let investor = ledger::investor_by_name(conn, arg(sub, "name")?)?;
            let report = engine
                .investor_investments(investor.id, target)
                .with_context(|| format!("Could not compute investments of '{}'", investor.name))?;
            if !maybe_print_json(json_flag, &report)? {
                println!("{}", render_investor(&report));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Dated breakdown of one investor's transfers followed by the total.
pub fn render_investor(report: &InvestorReport) -> String {
    let target = report.target.code();
    if report.lines.is_empty() {
        return format!(
            "Investor {} has no transfers.\nTotal investments: {}",
            report.investor.name,
            fmt_money(0.0, target)
        );
    }
    let rows = report
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            vec![
                (i + 1).to_string(),
                l.date.format("%d.%m.%Y").to_string(),
                fmt_money(l.amount, l.currency.code()),
                format!("1 {} = {:.4} {}", l.currency, l.rate, target),
                format!("{:.2}", l.converted),
            ]
        })
        .collect();
    let in_target = format!("In {}", target);
    format!(
        "Investments of {}\n{}\nTotal investments: {}",
        report.investor.name,
        pretty_table(&["#", "Date", "Amount", "Rate", &in_target], rows),
        fmt_money(report.total, target)
    )
}
