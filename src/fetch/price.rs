use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::fetch::FetchOutcome;
use crate::utils::serialization::{de_opt_f64, de_opt_i64};

const QUOTES_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";
const SYMBOL: &str = "TON";
const CONVERT: &str = "USD";

/// CoinMarketCap-backed quote client for the TON/USD spot price.
/// Fetches via `/v1/cryptocurrency/quotes/latest`.
#[derive(Debug, Clone)]
pub struct CmcQuoteClient {
    client: Client,
    base: Url,
    api_key: String,
}

impl CmcQuoteClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let base = Url::parse(QUOTES_URL).expect("valid url");
        Self::with_base_url(base, api_key)
    }

    /// Same client against a different endpoint; used by tests.
    pub fn with_base_url(base: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base,
            api_key: api_key.into(),
        }
    }

    /// Fetch the current TON price in USD.
    ///
    /// Never fails past this boundary: any error is logged and absorbed
    /// into an absent outcome stamped with `started_at`.
    pub async fn fetch(&self, started_at: NaiveDateTime) -> FetchOutcome {
        match self.request_quote().await {
            Ok(price) => {
                let received_at = Local::now().naive_local();
                let elapsed_ms = (received_at - started_at).num_milliseconds();
                tracing::info!(price, elapsed_ms, "TON price fetched");
                FetchOutcome::sampled(price, received_at)
            }
            Err(err) => {
                tracing::warn!("coinmarketcap: fetch failed: {err:#}");
                FetchOutcome::absent(started_at)
            }
        }
    }

    async fn request_quote(&self) -> Result<f64> {
        // Build URL with query params
        let mut url = self.base.clone();
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("symbol", SYMBOL);
            qp.append_pair("convert", CONVERT);
        }

        let resp = self
            .client
            .get(url)
            .header("Accepts", "application/json")
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .send()
            .await
            .context("coinmarketcap: request failed")?
            .error_for_status()
            .context("coinmarketcap: non-success status")?;

        let body = resp.bytes().await.context("coinmarketcap: read body failed")?;
        parse_quote(&body)
    }
}

/// Pull the TON/USD price out of the quote envelope.
///
/// A missing or non-zero `status.error_code` is a failure even when the
/// body otherwise parses.
fn parse_quote(body: &[u8]) -> Result<f64> {
    let envelope: QuoteEnvelope =
        serde_json::from_slice(body).context("coinmarketcap: parse JSON failed")?;

    if envelope.status.error_code != Some(0) {
        bail!(
            "coinmarketcap: API error (code {:?}): {}",
            envelope.status.error_code,
            envelope.status.error_message.as_deref().unwrap_or("no message")
        );
    }

    envelope
        .data
        .get(SYMBOL)
        .ok_or_else(|| anyhow!("coinmarketcap: symbol missing in response: {SYMBOL}"))?
        .quote
        .get(CONVERT)
        .ok_or_else(|| anyhow!("coinmarketcap: currency missing for symbol: {CONVERT}"))?
        .price
        .ok_or_else(|| anyhow!("coinmarketcap: price missing for {SYMBOL}/{CONVERT}"))
}

// Parse like: { "status": {"error_code": 0}, "data": { "TON": { "quote": { "USD": { "price": 2.47 }}}}}
#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    status: QuoteStatus,
    #[serde(default)]
    data: HashMap<String, SymbolQuotes>,
}

#[derive(Debug, Deserialize)]
struct QuoteStatus {
    #[serde(default, deserialize_with = "de_opt_i64")]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SymbolQuotes {
    #[serde(default)]
    quote: HashMap<String, CurrencyQuote>,
}

#[derive(Debug, Deserialize)]
struct CurrencyQuote {
    #[serde(default, deserialize_with = "de_opt_f64")]
    price: Option<f64>,
}
