// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;
use tempfile::NamedTempFile;
use treasurer::commands::importer::{self, ImportSummary};
use treasurer::models::PeriodUnit;
use treasurer::utils::PERPETUAL_PERIOD;
use treasurer::{cli, ledger};

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn transfer_import_is_idempotent() {
    let mut conn = treasurer::db::open_in_memory().unwrap();
    let file = csv_file(
        "investor,amount,currency,date\n\
         Ann,\"1 000,50\",USD,2024-06-01\n\
         Bob,200,EUR,2024-06-02\n\
         Ann,300,RUB,2024-06-03\n",
    );

    let first = importer::import_transfers(&mut conn, file.path()).unwrap();
    assert_eq!(
        first,
        ImportSummary {
            inserted: 3,
            skipped: 0,
            investors_created: 2,
        }
    );
    let second = importer::import_transfers(&mut conn, file.path()).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.investors_created, 0);

    let transfers = ledger::list_transfers(&conn).unwrap();
    assert_eq!(transfers.len(), 3);
    assert_eq!(transfers[0].amount, 1000.5);
}

#[test]
fn blank_rows_are_skipped_and_bad_rows_abort() {
    let mut conn = treasurer::db::open_in_memory().unwrap();
    let ok = csv_file("investor,amount,currency,date\nAnn,,USD,2024-06-01\nAnn,5,USD,2024-06-01\n");
    let s = importer::import_transfers(&mut conn, ok.path()).unwrap();
    assert_eq!((s.inserted, s.skipped), (1, 1));

    let bad = csv_file("investor,amount,currency,date\nAnn,7,USD,2024-06-05\nAnn,5,GBP,2024-06-01\n");
    let err = importer::import_transfers(&mut conn, bad.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Row 3"));
    // nothing from the aborted file was kept
    assert_eq!(ledger::list_transfers(&conn).unwrap().len(), 1);
}

#[test]
fn service_import_handles_perpetual_periods() {
    let mut conn = treasurer::db::open_in_memory().unwrap();
    let file = csv_file(
        "service,amount,currency,date,period,unit\n\
         Hosting,50,EUR,2024-06-01,1,month\n\
         Lifetime licence,300,USD,2024-06-02,unlimited,\n\
         Broken,10,USD,2024-06-03,2,\n",
    );
    let s = importer::import_services(&mut conn, file.path()).unwrap();
    assert_eq!((s.inserted, s.skipped), (2, 1));
    let again = importer::import_services(&mut conn, file.path()).unwrap();
    assert_eq!(again.inserted, 0);

    let items = ledger::list_service_purchases(&conn).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].period, PERPETUAL_PERIOD);
    assert_eq!(items[1].period_unit, PeriodUnit::Year);
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = treasurer::db::open_in_memory().unwrap();
    let file = csv_file("investor,amount,currency,date\nAnn,10,TRY,2024-02-03\n");
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    let matches = cli::build_cli().get_matches_from([
        "treasurer",
        "import",
        "transfers",
        "--path",
        &padded,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut conn, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(ledger::list_transfers(&conn).unwrap().len(), 1);
}
