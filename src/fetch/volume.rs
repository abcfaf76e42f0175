use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::fetch::FetchOutcome;
use crate::utils::serialization::de_opt_f64;

const DEX_SUMMARY_URL: &str = "https://api.llama.fi/summary/dexs/ston.fi";

/// DeFiLlama-backed client for the STON.fi cumulative DEX volume in USD.
#[derive(Debug, Clone)]
pub struct LlamaDexClient {
    client: Client,
    base: Url,
}

impl Default for LlamaDexClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlamaDexClient {
    pub fn new() -> Self {
        let base = Url::parse(DEX_SUMMARY_URL).expect("valid url");
        Self::with_base_url(base)
    }

    /// Same client against a different endpoint; used by tests.
    pub fn with_base_url(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    /// Fetch the all-time STON.fi volume in USD.
    ///
    /// Same absorb-all contract as the price fetcher: failures become an
    /// absent outcome stamped with `started_at`.
    pub async fn fetch(&self, started_at: NaiveDateTime) -> FetchOutcome {
        match self.request_summary().await {
            Ok(volume) => {
                let received_at = Local::now().naive_local();
                let elapsed_ms = (received_at - started_at).num_milliseconds();
                tracing::info!(volume, elapsed_ms, "DEX volume fetched");
                FetchOutcome::sampled(volume, received_at)
            }
            Err(err) => {
                tracing::warn!("defillama: fetch failed: {err:#}");
                FetchOutcome::absent(started_at)
            }
        }
    }

    async fn request_summary(&self) -> Result<f64> {
        // The chart series dominate the payload; only the scalar is needed.
        let mut url = self.base.clone();
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("excludeTotalDataChart", "true");
            qp.append_pair("excludeTotalDataChartBreakdown", "true");
        }

        let resp = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .context("defillama: request failed")?
            .error_for_status()
            .context("defillama: non-success status")?;

        let body = resp.bytes().await.context("defillama: read body failed")?;
        parse_summary(&body)
    }
}

fn parse_summary(body: &[u8]) -> Result<f64> {
    let summary: DexSummary =
        serde_json::from_slice(body).context("defillama: parse JSON failed")?;
    summary
        .total_all_time
        .ok_or_else(|| anyhow!("defillama: totalAllTime missing in response"))
}

#[derive(Debug, Deserialize)]
struct DexSummary {
    #[serde(rename = "totalAllTime", default, deserialize_with = "de_opt_f64")]
    total_all_time: Option<f64>,
}
