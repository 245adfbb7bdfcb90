// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod investors;
pub mod transfers;
pub mod purchases;
pub mod services;
pub mod fx;
pub mod reports;
pub mod importer;
pub mod exporter;
pub mod doctor;
pub mod settings;
pub mod interactive;

use crate::config::{AppConfig, RateMode};
use crate::models::Currency;
use crate::quotes::HttpQuoteSource;
use anyhow::Result;

/// The HTTP quote source, built only when auto-fetch is configured.
pub fn quote_source(cfg: &AppConfig) -> Result<Option<HttpQuoteSource>> {
    match cfg.rate_mode {
        RateMode::Auto => Ok(Some(HttpQuoteSource::new(cfg)?)),
        RateMode::Strict => Ok(None),
    }
}

/// `--currency` if given, the configured target currency otherwise.
pub fn target_currency(cfg: &AppConfig, sub: &clap::ArgMatches) -> Result<Currency> {
    match sub.get_one::<String>("currency") {
        Some(c) => Ok(c.parse()?),
        None => Ok(cfg.target_currency),
    }
}
