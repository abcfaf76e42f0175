use anyhow::Result;
use chrono::Local;

use ton_sampler::config::Config;
use ton_sampler::fetch::price::CmcQuoteClient;
use ton_sampler::fetch::volume::LlamaDexClient;
use ton_sampler::mirror::gcs::GcsClient;
use ton_sampler::utils::logging::init_logging;
use ton_sampler::{mirror, record, store};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env()?;

    store::ensure_initialized(&config.log_path)?;

    let run_at = Local::now().naive_local();
    let price_client = CmcQuoteClient::new(&config.cmc_api_key);
    let volume_client = LlamaDexClient::new();

    let row = record::collect(&price_client, &volume_client, run_at).await;
    store::append(&config.log_path, &row)?;
    tracing::info!(
        hour = %row.hour,
        path = %config.log_path.display(),
        "row appended"
    );

    if config.mirror_enabled {
        let remote = GcsClient::new(&config.bucket);
        let outcome =
            mirror::sync_last_row(&remote, &config.log_path, &config.remote_object).await?;
        tracing::info!(bucket = %config.bucket, ?outcome, "mirror sync finished");
    } else {
        tracing::info!("not a managed execution; skipping remote mirror");
    }

    Ok(())
}
