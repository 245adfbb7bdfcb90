// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use tempfile::tempdir;
use treasurer::commands::{exporter, importer};
use treasurer::ledger;
use treasurer::models::{Currency, NewPurchase, NewTransfer, PeriodUnit};

#[test]
fn exported_transfers_import_back_without_duplicates() {
    let mut conn = treasurer::db::open_in_memory().unwrap();
    let ann = ledger::add_investor(&conn, "Ann").unwrap();
    ledger::add_transfer(
        &conn,
        &NewTransfer {
            investor_id: ann.id,
            amount: 123.45,
            currency: Currency::Uah,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        },
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("transfers.csv");
    assert_eq!(exporter::export_transfers(&conn, "csv", &out).unwrap(), 1);
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("investor,amount,currency,date"));
    assert!(text.contains("Ann,123.45,UAH,2024-03-01"));

    let s = importer::import_transfers(&mut conn, &out).unwrap();
    assert_eq!((s.inserted, s.skipped), (0, 1));
}

#[test]
fn services_export_as_json() {
    let conn = treasurer::db::open_in_memory().unwrap();
    ledger::add_purchase(
        &conn,
        &NewPurchase {
            investor_id: None,
            service: "Hosting".into(),
            amount: 50.0,
            currency: Currency::Eur,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            period: 1,
            period_unit: PeriodUnit::Month,
        },
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("services.json");
    exporter::export_services(&conn, "json", &out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v[0]["service"], "Hosting");
    assert_eq!(v[0]["currency"], "EUR");
    assert_eq!(v[0]["unit"], "month");
    assert_eq!(v[0]["date"], "2024-06-01");

    assert!(exporter::export_services(&conn, "xlsx", &out).is_err());
}
