// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Cursor;
use treasurer::commands::interactive::run;
use treasurer::dialog::DialogKind;
use treasurer::ledger;

fn drive(conn: &rusqlite::Connection, kind: DialogKind, input: &str) -> (bool, String) {
    let mut out = Vec::new();
    let saved = run(conn, kind, Cursor::new(input.to_string()), &mut out).unwrap();
    (saved, String::from_utf8(out).unwrap())
}

#[test]
fn transfer_needs_an_investor_first() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let (saved, out) = drive(&conn, DialogKind::Transfer, "Ann\n100\nUSD\n2024-06-01\n");
    assert!(!saved);
    assert!(out.contains("No investors yet"));
    assert!(ledger::list_transfers(&conn).unwrap().is_empty());
}

#[test]
fn completed_transfer_is_saved() {
    let conn = treasurer::db::open_in_memory().unwrap();
    ledger::add_investor(&conn, "Ann").unwrap();
    let (saved, out) = drive(
        &conn,
        DialogKind::Transfer,
        "Ann\nabc\n1 000\nusd\n01.06.2024\n",
    );
    assert!(saved, "{}", out);
    assert!(out.contains("Investors: 1. Ann"));
    assert!(out.contains("Transfer of 1000.00 USD from 'Ann' on 2024-06-01 added."));
    let transfers = ledger::list_transfers(&conn).unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].amount, 1000.0);
}

#[test]
fn cancel_and_eof_save_nothing() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let (saved, out) = drive(&conn, DialogKind::Service, "Hosting\n50\ncancel\n");
    assert!(!saved);
    assert!(out.contains("Cancelled, nothing saved."));

    let (saved, _) = drive(&conn, DialogKind::Service, "Hosting\n50\nEUR\n");
    assert!(!saved);
    assert!(ledger::list_service_purchases(&conn).unwrap().is_empty());
}

#[test]
fn storage_rejection_is_an_error() {
    let conn = treasurer::db::open_in_memory().unwrap();
    ledger::add_investor(&conn, "Ann").unwrap();
    let mut out = Vec::new();
    let err = run(&conn, DialogKind::Investor, Cursor::new("Ann\n"), &mut out).unwrap_err();
    assert!(format!("{:#}", err).contains("already exists"), "{:#}", err);
    assert!(String::from_utf8(out).unwrap().contains("Nothing saved:"));
    assert_eq!(ledger::list_investors(&conn).unwrap().len(), 1);
}

#[test]
fn unknown_investor_is_asked_again_before_other_fields() {
    let conn = treasurer::db::open_in_memory().unwrap();
    ledger::add_investor(&conn, "Ann").unwrap();
    ledger::add_investor(&conn, "Bob").unwrap();
    let (saved, out) = drive(
        &conn,
        DialogKind::Purchase,
        "Carl\n2\nGPU\n30\nEUR\n2024-06-02\n1\nmonth\n",
    );
    assert!(saved, "{}", out);
    assert!(out.contains("Unknown investor 'Carl'"));
    let purchases = ledger::list_purchases(&conn).unwrap();
    assert_eq!(purchases.len(), 1);
    let bob = ledger::investor_by_name(&conn, "Bob").unwrap();
    assert_eq!(purchases[0].investor_id, bob.id);
}

#[test]
fn rate_dialog_writes_both_directions() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let (saved, out) = drive(&conn, DialogKind::Rate, "2024-06-01\nusd\nrub\n80\n");
    assert!(saved, "{}", out);
    assert!(out.contains("inverse 1 RUB = 0.0125 USD"));
    assert_eq!(ledger::list_rates(&conn, 10).unwrap().len(), 2);
}
