// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn currency_override() -> Arg {
    Arg::new("currency")
        .long("currency")
        .short('c')
        .help("Report currency (defaults to the configured target currency)")
}

fn entry_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("amount").long("amount").required(true))
        .arg(Arg::new("currency").long("currency").required(true))
        .arg(
            Arg::new("date")
                .long("date")
                .required(true)
                .help("YYYY-MM-DD or DD.MM.YYYY"),
        )
}

fn recurrence_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .default_value("1")
            .help("Period length, or 'unlimited'"),
    )
    .arg(
        Arg::new("unit")
            .long("unit")
            .default_value("month")
            .help("week, month or year"),
    )
}

pub fn build_cli() -> Command {
    Command::new("treasurer")
        .about("Investment-group ledger: transfers, purchases, FX rates and treasury balance")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging to stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("investor")
                .about("Manage investors")
                .subcommand(Command::new("add").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("transfer")
                .about("Investor capital transfers")
                .subcommand(entry_args(
                    Command::new("add").arg(Arg::new("investor").long("investor").required(true)),
                ))
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("investor").long("investor"))
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("purchase")
                .about("Purchases paid by an investor")
                .subcommand(recurrence_args(entry_args(
                    Command::new("add")
                        .arg(Arg::new("investor").long("investor").required(true))
                        .arg(Arg::new("service").long("service").required(true)),
                )))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("service")
                .about("Purchases paid from the group treasury")
                .subcommand(recurrence_args(entry_args(
                    Command::new("add").arg(Arg::new("service").long("service").required(true)),
                )))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("rate")
                .about("Exchange rates (1 FROM = RATE TO on DATE)")
                .subcommand(
                    Command::new("set")
                        .about("Record a rate and its inverse")
                        .arg(Arg::new("date").required(true))
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true))
                        .arg(Arg::new("rate").required(true)),
                )
                .subcommand(
                    Command::new("get")
                        .about("Resolve a rate the way reports do")
                        .arg(Arg::new("date").required(true))
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true)),
                )
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .default_value("50"),
                        )
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Totals in one currency")
                .subcommand(
                    Command::new("purchases")
                        .arg(currency_override())
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("investments")
                        .arg(currency_override())
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("treasury")
                        .arg(currency_override())
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("investor")
                        .arg(Arg::new("name").required(true))
                        .arg(currency_override())
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk import from CSV")
                .subcommand(
                    Command::new("transfers")
                        .about("Columns: investor,amount,currency,date")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("services")
                        .about("Columns: service,amount,currency,date,period,unit")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export records")
                .subcommand(
                    Command::new("transfers")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("services")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Find missing rates and duplicate transfers")
                .arg(currency_override()),
        )
        .subcommand(
            Command::new("interactive")
                .about("Step-by-step entry; type 'cancel' to abort")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(["investor", "transfer", "purchase", "service", "rate"]),
                ),
        )
}

/// Fetches a required string argument.
pub fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("missing argument '{}'", name))
}
