// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! External source of current exchange-rate quotes.

use crate::config::AppConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::utils::http_client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Something that can quote the rate in effect right now.
pub trait QuoteSource {
    fn current_rate(&self, from: &str, to: &str) -> LedgerResult<f64>;
}

#[derive(Debug, Deserialize)]
struct PairQuote {
    result: Option<String>,
    conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

/// Validates a pair-quote payload and extracts the conversion rate.
pub fn parse_quote_body(body: &str) -> LedgerResult<f64> {
    let q: PairQuote = serde_json::from_str(body)
        .map_err(|e| LedgerError::RateFetch(format!("malformed quote payload: {}", e)))?;
    match q.result.as_deref() {
        Some("success") => {}
        Some("error") => {
            return Err(LedgerError::RateFetch(format!(
                "quote service error: {}",
                q.error_type.as_deref().unwrap_or("unknown error")
            )));
        }
        other => {
            return Err(LedgerError::RateFetch(format!(
                "unexpected quote result {:?}",
                other
            )));
        }
    }
    match q.conversion_rate {
        Some(r) if r.is_finite() && r > 0.0 => Ok(r),
        Some(r) => Err(LedgerError::RateFetch(format!(
            "quote service returned a non-positive rate {}",
            r
        ))),
        None => Err(LedgerError::RateFetch(
            "quote payload has no conversion_rate".into(),
        )),
    }
}

/// `GET <endpoint>[/<api_key>/pair]/<FROM>/<TO>` over a blocking client.
pub struct HttpQuoteSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpQuoteSource {
    pub fn new(cfg: &AppConfig) -> LedgerResult<Self> {
        let client = http_client(cfg.quote_timeout())
            .map_err(|e| LedgerError::RateFetch(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: cfg.quote_endpoint.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn url_for(&self, from: &str, to: &str) -> String {
        match &self.api_key {
            Some(key) => format!("{}/{}/pair/{}/{}", self.endpoint, key, from, to),
            None => format!("{}/{}/{}", self.endpoint, from, to),
        }
    }
}

impl QuoteSource for HttpQuoteSource {
    fn current_rate(&self, from: &str, to: &str) -> LedgerResult<f64> {
        debug!(%from, %to, "requesting current quote");
        let resp = self
            .client
            .get(self.url_for(from, to))
            .send()
            .map_err(|e| {
                // the url carries the api key
                let e = e.without_url();
                warn!(%from, %to, error = %e, "quote request failed");
                LedgerError::RateFetch(format!("request for {}->{} failed: {}", from, to, e))
            })?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%from, %to, %status, "quote service returned an error status");
            return Err(LedgerError::RateFetch(format!(
                "quote service answered {} for {}->{}",
                status, from, to
            )));
        }
        let body = resp
            .text()
            .map_err(|e| {
                LedgerError::RateFetch(format!("could not read quote body: {}", e.without_url()))
            })?;
        parse_quote_body(&body)
    }
}
