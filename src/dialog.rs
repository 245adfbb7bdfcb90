// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Step-by-step data entry.
//!
//! A [`Dialog`] asks for one field at a time and keeps the answers in memory.
//! Nothing is returned for storage until the last field is accepted, and
//! `cancel` drops everything collected so far.

use crate::models::{Currency, PeriodUnit};
use crate::utils::{parse_amount, parse_date, parse_period, parse_rate_code};
use chrono::NaiveDate;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Investor,
    Transfer,
    Purchase,
    Service,
    Rate,
}

impl FromStr for DialogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "investor" => Ok(DialogKind::Investor),
            "transfer" => Ok(DialogKind::Transfer),
            "purchase" => Ok(DialogKind::Purchase),
            "service" => Ok(DialogKind::Service),
            "rate" => Ok(DialogKind::Rate),
            other => Err(format!(
                "Unknown dialog '{}', expected investor, transfer, purchase, service or rate",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Investor,
    Service,
    Amount,
    Currency,
    Date,
    Period,
    Unit,
    From,
    To,
    Rate,
}

impl Field {
    fn prompt(self) -> String {
        match self {
            Field::Name => "Investor name:".into(),
            Field::Investor => "Investor:".into(),
            Field::Service => "Service name:".into(),
            Field::Amount => "Amount:".into(),
            Field::Currency => {
                let codes: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
                format!("Currency ({}):", codes.join("/"))
            }
            Field::Date => "Date (YYYY-MM-DD or DD.MM.YYYY):".into(),
            Field::Period => "Period length (number or 'unlimited'):".into(),
            Field::Unit => "Period unit (week/month/year):".into(),
            Field::From => "From currency:".into(),
            Field::To => "To currency:".into(),
            Field::Rate => "Rate (1 from = ? to):".into(),
        }
    }
}

fn fields(kind: DialogKind) -> &'static [Field] {
    match kind {
        DialogKind::Investor => &[Field::Name],
        DialogKind::Transfer => &[Field::Investor, Field::Amount, Field::Currency, Field::Date],
        DialogKind::Purchase => &[
            Field::Investor,
            Field::Service,
            Field::Amount,
            Field::Currency,
            Field::Date,
            Field::Period,
            Field::Unit,
        ],
        DialogKind::Service => &[
            Field::Service,
            Field::Amount,
            Field::Currency,
            Field::Date,
            Field::Period,
            Field::Unit,
        ],
        DialogKind::Rate => &[Field::Date, Field::From, Field::To, Field::Rate],
    }
}

/// Field values collected by a finished dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum Completed {
    Investor {
        name: String,
    },
    Transfer {
        investor: String,
        amount: f64,
        currency: Currency,
        date: NaiveDate,
    },
    Purchase {
        investor: Option<String>,
        service: String,
        amount: f64,
        currency: Currency,
        date: NaiveDate,
        period: u32,
        unit: PeriodUnit,
    },
    Rate {
        date: NaiveDate,
        from: String,
        to: String,
        rate: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Ask the next question.
    Prompt(String),
    /// The last answer was rejected; ask again.
    Retry { error: String, prompt: String },
    Done(Completed),
    Cancelled,
}

#[derive(Debug, Default)]
struct Draft {
    text: Option<String>,
    investor: Option<String>,
    amount: Option<f64>,
    currency: Option<Currency>,
    date: Option<NaiveDate>,
    period: Option<u32>,
    unit: Option<PeriodUnit>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug)]
pub struct Dialog {
    kind: DialogKind,
    pos: usize,
    draft: Draft,
    finished: bool,
    investors: Vec<String>,
}

pub const CANCEL_WORDS: [&str; 2] = ["cancel", "/cancel"];

impl Dialog {
    pub fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            pos: 0,
            draft: Draft::default(),
            finished: false,
            investors: Vec::new(),
        }
    }

    /// Restricts the investor step to `names`, answered by name or by
    /// 1-based position in the list.
    pub fn with_investors(kind: DialogKind, names: Vec<String>) -> Self {
        Self {
            investors: names,
            ..Self::new(kind)
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    /// The question for the field currently awaited.
    pub fn prompt(&self) -> Option<String> {
        fields(self.kind).get(self.pos).map(|f| f.prompt())
    }

    pub fn feed(&mut self, line: &str) -> Step {
        if self.finished {
            return Step::Cancelled;
        }
        let line = line.trim();
        if CANCEL_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
            return self.cancel();
        }
        let Some(&field) = fields(self.kind).get(self.pos) else {
            return self.cancel();
        };
        if let Err(error) = self.accept(field, line) {
            return Step::Retry {
                error,
                prompt: field.prompt(),
            };
        }
        self.pos += 1;
        match self.prompt() {
            Some(p) => Step::Prompt(p),
            None => {
                self.finished = true;
                match self.finish() {
                    Some(done) => Step::Done(done),
                    None => Step::Cancelled,
                }
            }
        }
    }

    /// Abandons the dialog; collected answers are discarded.
    pub fn cancel(&mut self) -> Step {
        self.finished = true;
        self.draft = Draft::default();
        Step::Cancelled
    }

    fn accept(&mut self, field: Field, line: &str) -> Result<(), String> {
        let d = &mut self.draft;
        match field {
            Field::Name | Field::Service => {
                if line.is_empty() {
                    return Err("Value must not be empty".into());
                }
                d.text = Some(line.to_string());
            }
            Field::Investor => {
                if line.is_empty() {
                    return Err("Investor must not be empty".into());
                }
                d.investor = Some(pick_investor(&self.investors, line)?);
            }
            Field::Amount | Field::Rate => {
                d.amount = Some(parse_amount(line).map_err(|e| e.to_string())?);
            }
            Field::Currency => {
                d.currency = Some(line.parse::<Currency>().map_err(|e| e.to_string())?)
            }
            Field::Date => d.date = Some(parse_date(line).map_err(|e| e.to_string())?),
            Field::Period => d.period = Some(parse_period(line).map_err(|e| e.to_string())?),
            Field::Unit => d.unit = Some(line.parse::<PeriodUnit>().map_err(|e| e.to_string())?),
            Field::From => d.from = Some(parse_rate_code(line).map_err(|e| e.to_string())?),
            Field::To => {
                let to = parse_rate_code(line).map_err(|e| e.to_string())?;
                if d.from.as_deref() == Some(to.as_str()) {
                    return Err("Target currency must differ from source currency".into());
                }
                d.to = Some(to);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Option<Completed> {
        let d = std::mem::take(&mut self.draft);
        let done = match self.kind {
            DialogKind::Investor => Completed::Investor { name: d.text? },
            DialogKind::Transfer => Completed::Transfer {
                investor: d.investor?,
                amount: d.amount?,
                currency: d.currency?,
                date: d.date?,
            },
            DialogKind::Purchase | DialogKind::Service => Completed::Purchase {
                investor: d.investor,
                service: d.text?,
                amount: d.amount?,
                currency: d.currency?,
                date: d.date?,
                period: d.period?,
                unit: d.unit?,
            },
            DialogKind::Rate => Completed::Rate {
                date: d.date?,
                from: d.from?,
                to: d.to?,
                rate: d.amount?,
            },
        };
        Some(done)
    }
}

fn pick_investor(known: &[String], line: &str) -> Result<String, String> {
    if known.is_empty() {
        return Ok(line.to_string());
    }
    if let Some(name) = known.iter().find(|n| n.as_str() == line) {
        return Ok(name.clone());
    }
    match line.parse::<usize>() {
        Ok(n) if (1..=known.len()).contains(&n) => Ok(known[n - 1].clone()),
        _ => Err(format!(
            "Unknown investor '{}', choose one of: {}",
            line,
            known.join(", ")
        )),
    }
}
