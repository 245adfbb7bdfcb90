// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reads and writes against the ledger tables.
//!
//! Every function borrows the caller's connection. Multi-row writes open their
//! own transaction, so callers never see half of a rate pair.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    ExchangeRate, Investor, NewPurchase, NewTransfer, Purchase, ServicePurchase, SpendRecord,
    Transfer,
};
use crate::utils::{ensure_positive, parse_rate_code};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

pub fn add_investor(conn: &Connection, name: &str) -> LedgerResult<Investor> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("Investor name must not be empty"));
    }
    if find_investor(conn, name)?.is_some() {
        return Err(LedgerError::Validation(format!(
            "Investor '{}' already exists",
            name
        )));
    }
    conn.execute("INSERT INTO investors(name) VALUES (?1)", params![name])?;
    let investor = Investor {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    };
    info!(id = investor.id, name = %investor.name, "investor added");
    Ok(investor)
}

pub fn find_investor(conn: &Connection, name: &str) -> LedgerResult<Option<Investor>> {
    let inv = conn
        .query_row(
            "SELECT id, name FROM investors WHERE name=?1",
            params![name.trim()],
            |r| {
                Ok(Investor {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(inv)
}

pub fn investor_by_name(conn: &Connection, name: &str) -> LedgerResult<Investor> {
    find_investor(conn, name)?
        .ok_or_else(|| LedgerError::NotFound(format!("Investor '{}' not found", name.trim())))
}

pub fn investor_by_id(conn: &Connection, id: i64) -> LedgerResult<Investor> {
    conn.query_row(
        "SELECT id, name FROM investors WHERE id=?1",
        params![id],
        |r| {
            Ok(Investor {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::NotFound(format!("Investor #{} not found", id)))
}

pub fn list_investors(conn: &Connection) -> LedgerResult<Vec<Investor>> {
    let mut stmt = conn.prepare("SELECT id, name FROM investors ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Investor {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Removes an investor that owns no transfers or purchases.
pub fn remove_investor(conn: &Connection, name: &str) -> LedgerResult<Investor> {
    let investor = investor_by_name(conn, name)?;
    let (transfers, purchases): (i64, i64) = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM transfers WHERE investor_id=?1),
                (SELECT COUNT(*) FROM purchases WHERE investor_id=?1)",
        params![investor.id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    if transfers > 0 || purchases > 0 {
        return Err(LedgerError::Validation(format!(
            "Investor '{}' still owns {} transfer(s) and {} purchase(s); ledger records are never deleted",
            investor.name, transfers, purchases
        )));
    }
    conn.execute("DELETE FROM investors WHERE id=?1", params![investor.id])?;
    info!(id = investor.id, name = %investor.name, "investor removed");
    Ok(investor)
}

pub fn add_transfer(conn: &Connection, t: &NewTransfer) -> LedgerResult<i64> {
    ensure_positive(t.amount, "Amount")?;
    investor_by_id(conn, t.investor_id)?;
    conn.execute(
        "INSERT INTO transfers(investor_id, amount, currency, date) VALUES (?1, ?2, ?3, ?4)",
        params![t.investor_id, t.amount, t.currency, t.date],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, amount = t.amount, currency = %t.currency, date = %t.date, "transfer added");
    Ok(id)
}

pub fn transfer_exists(conn: &Connection, t: &NewTransfer) -> LedgerResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM transfers
             WHERE investor_id=?1 AND amount=?2 AND currency=?3 AND date=?4 LIMIT 1",
            params![t.investor_id, t.amount, t.currency, t.date],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn validate_purchase(p: &NewPurchase) -> LedgerResult<()> {
    if p.service.trim().is_empty() {
        return Err(LedgerError::validation("Service name must not be empty"));
    }
    ensure_positive(p.amount, "Amount")?;
    if p.period == 0 {
        return Err(LedgerError::validation("Period must be a positive whole number"));
    }
    Ok(())
}

/// Stores an investor purchase when `investor_id` is set, a group service
/// purchase otherwise.
pub fn add_purchase(conn: &Connection, p: &NewPurchase) -> LedgerResult<i64> {
    validate_purchase(p)?;
    match p.investor_id {
        Some(investor_id) => {
            investor_by_id(conn, investor_id)?;
            conn.execute(
                "INSERT INTO purchases(investor_id, service, amount, currency, date, period, period_unit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    investor_id,
                    p.service.trim(),
                    p.amount,
                    p.currency,
                    p.date,
                    p.period,
                    p.period_unit
                ],
            )?;
        }
        None => {
            conn.execute(
                "INSERT INTO service_purchases(service, amount, currency, date, period, period_unit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    p.service.trim(),
                    p.amount,
                    p.currency,
                    p.date,
                    p.period,
                    p.period_unit
                ],
            )?;
        }
    }
    let id = conn.last_insert_rowid();
    debug!(id, service = %p.service, amount = p.amount, currency = %p.currency, "purchase added");
    Ok(id)
}

pub fn service_purchase_exists(conn: &Connection, p: &NewPurchase) -> LedgerResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM service_purchases
             WHERE service=?1 AND amount=?2 AND currency=?3 AND date=?4
               AND period=?5 AND period_unit=?6 LIMIT 1",
            params![
                p.service.trim(),
                p.amount,
                p.currency,
                p.date,
                p.period,
                p.period_unit
            ],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn transfer_from_row(r: &Row<'_>) -> rusqlite::Result<Transfer> {
    Ok(Transfer {
        id: r.get(0)?,
        investor_id: r.get(1)?,
        amount: r.get(2)?,
        currency: r.get(3)?,
        date: r.get(4)?,
    })
}

pub fn list_transfers(conn: &Connection) -> LedgerResult<Vec<Transfer>> {
    let mut stmt = conn.prepare(
        "SELECT id, investor_id, amount, currency, date FROM transfers ORDER BY date, id",
    )?;
    let rows = stmt.query_map([], transfer_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list_transfers_for(conn: &Connection, investor_id: i64) -> LedgerResult<Vec<Transfer>> {
    let mut stmt = conn.prepare(
        "SELECT id, investor_id, amount, currency, date FROM transfers
         WHERE investor_id=?1 ORDER BY date, id",
    )?;
    let rows = stmt.query_map(params![investor_id], transfer_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list_purchases(conn: &Connection) -> LedgerResult<Vec<Purchase>> {
    let mut stmt = conn.prepare(
        "SELECT id, investor_id, service, amount, currency, date, period, period_unit
         FROM purchases ORDER BY date, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(Purchase {
            id: r.get(0)?,
            investor_id: r.get(1)?,
            service: r.get(2)?,
            amount: r.get(3)?,
            currency: r.get(4)?,
            date: r.get(5)?,
            period: r.get(6)?,
            period_unit: r.get(7)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list_service_purchases(conn: &Connection) -> LedgerResult<Vec<ServicePurchase>> {
    let mut stmt = conn.prepare(
        "SELECT id, service, amount, currency, date, period, period_unit
         FROM service_purchases ORDER BY date, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(ServicePurchase {
            id: r.get(0)?,
            service: r.get(1)?,
            amount: r.get(2)?,
            currency: r.get(3)?,
            date: r.get(4)?,
            period: r.get(5)?,
            period_unit: r.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Investor purchases followed by group service purchases.
pub fn list_spend(conn: &Connection) -> LedgerResult<Vec<SpendRecord>> {
    let mut out: Vec<SpendRecord> = list_purchases(conn)?
        .into_iter()
        .map(SpendRecord::Investor)
        .collect();
    out.extend(
        list_service_purchases(conn)?
            .into_iter()
            .map(SpendRecord::Group),
    );
    Ok(out)
}

pub fn find_rate(
    conn: &Connection,
    from: &str,
    to: &str,
    date: NaiveDate,
) -> LedgerResult<Option<f64>> {
    let rate = conn
        .query_row(
            "SELECT rate FROM exchange_rates WHERE from_currency=?1 AND to_currency=?2 AND date=?3",
            params![from, to, date],
            |r| r.get(0),
        )
        .optional()?;
    Ok(rate)
}

/// Records `1 from = rate to` on `date` together with the inverse rate, in one
/// transaction. Existing rows for either direction are updated in place.
pub fn upsert_rate(
    conn: &Connection,
    from: &str,
    to: &str,
    date: NaiveDate,
    rate: f64,
) -> LedgerResult<f64> {
    let from = parse_rate_code(from)?;
    let to = parse_rate_code(to)?;
    if from == to {
        return Err(LedgerError::Validation(format!(
            "A {from}->{to} rate is always 1; record rates between different currencies"
        )));
    }
    let rate = ensure_positive(rate, "Rate")?;
    let inverse = 1.0 / rate;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO exchange_rates(from_currency, to_currency, rate, date) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(from_currency, to_currency, date) DO UPDATE SET rate=excluded.rate",
        )?;
        stmt.execute(params![from, to, rate, date])?;
        stmt.execute(params![to, from, inverse, date])?;
    }
    tx.commit()?;
    info!(%date, %from, %to, rate, inverse, "exchange rate recorded");
    Ok(inverse)
}

pub fn list_rates(conn: &Connection, limit: usize) -> LedgerResult<Vec<ExchangeRate>> {
    let mut stmt = conn.prepare(
        "SELECT id, from_currency, to_currency, rate, date, created_at FROM exchange_rates
         ORDER BY date DESC, from_currency, to_currency LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |r| {
        Ok(ExchangeRate {
            id: r.get(0)?,
            from_currency: r.get(1)?,
            to_currency: r.get(2)?,
            rate: r.get(3)?,
            date: r.get(4)?,
            created_at: r.get(5)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
