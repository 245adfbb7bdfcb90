// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Treasurer", "treasurer"));

pub const DB_PATH_ENV: &str = "TREASURER_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("treasurer.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Opens a private in-memory ledger with the full schema.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS investors(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE CHECK(length(trim(name)) > 0),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS transfers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        investor_id INTEGER NOT NULL,
        amount REAL NOT NULL CHECK(amount > 0),
        currency TEXT NOT NULL CHECK(currency IN ('USD','EUR','RUB','UAH','INR','TRY')),
        date TEXT NOT NULL,
        FOREIGN KEY(investor_id) REFERENCES investors(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_transfers_investor ON transfers(investor_id, date);

    CREATE TABLE IF NOT EXISTS purchases(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        investor_id INTEGER NOT NULL,
        service TEXT NOT NULL,
        amount REAL NOT NULL CHECK(amount > 0),
        currency TEXT NOT NULL CHECK(currency IN ('USD','EUR','RUB','UAH','INR','TRY')),
        date TEXT NOT NULL,
        period INTEGER NOT NULL CHECK(period > 0),
        period_unit TEXT NOT NULL CHECK(period_unit IN ('week','month','year')),
        FOREIGN KEY(investor_id) REFERENCES investors(id) ON DELETE RESTRICT
    );

    CREATE TABLE IF NOT EXISTS service_purchases(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        service TEXT NOT NULL,
        amount REAL NOT NULL CHECK(amount > 0),
        currency TEXT NOT NULL CHECK(currency IN ('USD','EUR','RUB','UAH','INR','TRY')),
        date TEXT NOT NULL,
        period INTEGER NOT NULL CHECK(period > 0),
        period_unit TEXT NOT NULL CHECK(period_unit IN ('week','month','year'))
    );
    CREATE INDEX IF NOT EXISTS idx_service_purchases_date ON service_purchases(date);

    -- 1 from_currency = rate to_currency on that exact date
    CREATE TABLE IF NOT EXISTS exchange_rates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        from_currency TEXT NOT NULL,
        to_currency TEXT NOT NULL,
        rate REAL NOT NULL CHECK(rate > 0),
        date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(from_currency, to_currency, date)
    );
    "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('investors','transfers','purchases','service_purchases','exchange_rates','settings')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 6);
    }

    #[test]
    fn schema_rejects_unknown_currency() {
        let conn = open_in_memory().unwrap();
        conn.execute("INSERT INTO investors(name) VALUES ('Ann')", [])
            .unwrap();
        let res = conn.execute(
            "INSERT INTO transfers(investor_id, amount, currency, date) VALUES (1, 10, 'GBP', '2024-01-01')",
            [],
        );
        assert!(res.is_err());
    }
}
