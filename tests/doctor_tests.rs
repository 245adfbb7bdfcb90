// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use treasurer::commands::doctor::{Issue, find_issues};
use treasurer::ledger;
use treasurer::models::{Currency, NewPurchase, NewTransfer, PeriodUnit};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn clean_ledger_has_no_issues() {
    let conn = treasurer::db::open_in_memory().unwrap();
    assert!(find_issues(&conn, Currency::Rub).unwrap().is_empty());
}

#[test]
fn reports_missing_rates_and_duplicates() {
    let conn = treasurer::db::open_in_memory().unwrap();
    let ann = ledger::add_investor(&conn, "Ann").unwrap();
    let t = NewTransfer {
        investor_id: ann.id,
        amount: 100.0,
        currency: Currency::Usd,
        date: d(2024, 6, 1),
    };
    ledger::add_transfer(&conn, &t).unwrap();
    ledger::add_transfer(&conn, &t).unwrap();
    ledger::add_transfer(
        &conn,
        &NewTransfer {
            currency: Currency::Rub,
            ..t.clone()
        },
    )
    .unwrap();
    ledger::add_purchase(
        &conn,
        &NewPurchase {
            investor_id: Some(ann.id),
            service: "GPU".into(),
            amount: 30.0,
            currency: Currency::Eur,
            date: d(2024, 6, 2),
            period: 1,
            period_unit: PeriodUnit::Month,
        },
    )
    .unwrap();
    ledger::upsert_rate(&conn, "USD", "RUB", d(2024, 6, 1), 90.0).unwrap();

    let issues = find_issues(&conn, Currency::Rub).unwrap();
    assert_eq!(
        issues,
        vec![
            Issue::MissingRate {
                date: d(2024, 6, 2),
                from: Currency::Eur,
                to: Currency::Rub,
            },
            Issue::DuplicateTransfer {
                investor: "Ann".into(),
                amount: 100.0,
                currency: "USD".into(),
                date: "2024-06-01".into(),
                copies: 2,
            },
        ]
    );

    // against USD the stored inverse covers the RUB transfer
    let in_usd = find_issues(&conn, Currency::Usd).unwrap();
    assert!(in_usd.contains(&Issue::MissingRate {
        date: d(2024, 6, 2),
        from: Currency::Eur,
        to: Currency::Usd,
    }));
    assert!(!in_usd.iter().any(|i| matches!(
        i,
        Issue::MissingRate {
            from: Currency::Rub,
            ..
        }
    )));
}
