//! The per-invocation sample row and the concurrent collect step.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::fetch::price::CmcQuoteClient;
use crate::fetch::volume::LlamaDexClient;
use crate::fetch::FetchOutcome;

/// Zero out minutes, seconds and sub-second components, keeping the date.
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroed time components are in range")
}

/// One CSV row. Field order is the column order; never reorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    /// Invocation time truncated to the start of its hour.
    pub hour: NaiveDateTime,
    /// Exact invocation time.
    pub timestamp: NaiveDateTime,
    pub ton_price: Option<f64>,
    pub ton_price_received_at: NaiveDateTime,
    #[serde(rename = "volume_usd_float")]
    pub volume_usd: Option<f64>,
    pub volume_usd_received_at: NaiveDateTime,
}

impl SampleRecord {
    /// Assemble the row from both fetch outcomes. Absence maps to an empty
    /// value column with the fetch start time in the received-at column.
    pub fn assemble(run_at: NaiveDateTime, price: FetchOutcome, volume: FetchOutcome) -> Self {
        Self {
            hour: truncate_to_hour(run_at),
            timestamp: run_at,
            ton_price: price.value(),
            ton_price_received_at: price.received_at(),
            volume_usd: volume.value(),
            volume_usd_received_at: volume.received_at(),
        }
    }
}

/// Run both fetchers concurrently and assemble the row.
///
/// Each fetcher gets its own task; a join failure is absorbed like any
/// other fetch failure, so this step itself cannot fail.
pub async fn collect(
    price: &CmcQuoteClient,
    volume: &LlamaDexClient,
    run_at: NaiveDateTime,
) -> SampleRecord {
    let price_task = tokio::spawn({
        let client = price.clone();
        async move { client.fetch(run_at).await }
    });
    let volume_task = tokio::spawn({
        let client = volume.clone();
        async move { client.fetch(run_at).await }
    });

    let price_outcome = match price_task.await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!("price fetch task failed: {err}");
            FetchOutcome::absent(run_at)
        }
    };
    let volume_outcome = match volume_task.await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!("volume fetch task failed: {err}");
            FetchOutcome::absent(run_at)
        }
    };

    SampleRecord::assemble(run_at, price_outcome, volume_outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reqwest::Url;

    fn at(hour: u32, min: u32, sec: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_milli_opt(hour, min, sec, milli)
            .unwrap()
    }

    #[test]
    fn truncates_to_start_of_hour() {
        assert_eq!(truncate_to_hour(at(14, 37, 52, 123)), at(14, 0, 0, 0));
    }

    #[test]
    fn truncation_is_idempotent() {
        assert_eq!(truncate_to_hour(at(14, 0, 0, 0)), at(14, 0, 0, 0));
    }

    #[test]
    fn truncation_keeps_the_calendar_day() {
        assert_eq!(truncate_to_hour(at(0, 59, 59, 999)), at(0, 0, 0, 0));
        assert_eq!(truncate_to_hour(at(23, 59, 59, 999)), at(23, 0, 0, 0));
    }

    #[test]
    fn assemble_maps_sampled_values() {
        let run = at(14, 37, 52, 123);
        let price_at = at(14, 37, 52, 500);
        let volume_at = at(14, 37, 53, 0);

        let rec = SampleRecord::assemble(
            run,
            FetchOutcome::sampled(2.345, price_at),
            FetchOutcome::sampled(6_582_902_239.0, volume_at),
        );

        assert_eq!(rec.hour, at(14, 0, 0, 0));
        assert_eq!(rec.timestamp, run);
        assert_eq!(rec.ton_price, Some(2.345));
        assert_eq!(rec.ton_price_received_at, price_at);
        assert_eq!(rec.volume_usd, Some(6_582_902_239.0));
        assert_eq!(rec.volume_usd_received_at, volume_at);
    }

    #[test]
    fn assemble_maps_absence_to_empty_value_and_start_time() {
        let run = at(9, 5, 0, 0);

        let rec =
            SampleRecord::assemble(run, FetchOutcome::absent(run), FetchOutcome::absent(run));

        assert_eq!(rec.ton_price, None);
        assert_eq!(rec.ton_price_received_at, run);
        assert_eq!(rec.volume_usd, None);
        assert_eq!(rec.volume_usd_received_at, run);
    }

    #[tokio::test]
    async fn collect_absorbs_unreachable_endpoints() {
        let run = at(14, 37, 52, 123);
        let price = CmcQuoteClient::with_base_url(
            Url::parse("http://127.0.0.1:9/quotes").unwrap(),
            "test-key",
        );
        let volume =
            LlamaDexClient::with_base_url(Url::parse("http://127.0.0.1:9/summary").unwrap());

        let rec = collect(&price, &volume, run).await;

        assert_eq!(rec.hour, at(14, 0, 0, 0));
        assert_eq!(rec.timestamp, run);
        assert_eq!(rec.ton_price, None);
        assert_eq!(rec.ton_price_received_at, run);
        assert_eq!(rec.volume_usd, None);
        assert_eq!(rec.volume_usd_received_at, run);
    }
}
