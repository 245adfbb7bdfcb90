// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use treasurer::{cli, commands, db, log};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    log::init_logging(matches.get_flag("verbose"));

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("investor", sub)) => commands::investors::handle(&conn, sub)?,
        Some(("transfer", sub)) => commands::transfers::handle(&conn, sub)?,
        Some(("purchase", sub)) => commands::purchases::handle(&conn, sub)?,
        Some(("service", sub)) => commands::services::handle(&conn, sub)?,
        Some(("rate", sub)) => commands::fx::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, sub)?,
        Some(("interactive", sub)) => commands::interactive::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
