// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::arg;
use crate::config::{API_KEY_ENV, AppConfig, set_setting};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = set_setting(conn, key, arg(sub, "value")?)?;
            println!("{} = {}", key, value);
        }
        _ => {
            let cfg = AppConfig::load(conn)?;
            let key_state = if cfg.api_key.is_some() {
                "set"
            } else {
                "not set"
            };
            let rows = vec![
                vec!["target_currency".into(), cfg.target_currency.to_string()],
                vec!["rate_mode".into(), cfg.rate_mode.to_string()],
                vec!["quote_endpoint".into(), cfg.quote_endpoint.clone()],
                vec!["quote_timeout_secs".into(), cfg.quote_timeout_secs.to_string()],
                vec![API_KEY_ENV.to_string(), key_state.to_string()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
    }
    Ok(())
}
