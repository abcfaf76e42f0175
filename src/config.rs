//! Environment-derived configuration.
//!
//! Everything the sampler needs comes from the process environment,
//! optionally seeded from a `.env` file: the CoinMarketCap credential and
//! the Cloud Run markers that gate the remote mirror. File, bucket and
//! object names are fixed.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

/// Local CSV log, also the object name of its remote mirror.
pub const LOG_FILE_NAME: &str = "output_cmc_llama.csv";
/// Bucket holding the mirrored copy.
pub const MIRROR_BUCKET: &str = "ton_info_hourly";

const API_KEY_ENV_VAR: &str = "CMC_API_KEY";
/// Placeholder shipped in `.env` templates; treated the same as unset.
const API_KEY_PLACEHOLDER: &str = "123";

#[derive(Debug, Clone)]
pub struct Config {
    /// CoinMarketCap credential, sent as the `X-CMC_PRO_API_KEY` header.
    pub cmc_api_key: String,
    pub log_path: PathBuf,
    pub bucket: String,
    pub remote_object: String,
    /// True under Cloud Run; gates the mirror step.
    pub mirror_enabled: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails on a missing or placeholder credential so no request is ever
    /// sent with an unusable key.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cmc_api_key = resolve_api_key(env::var(API_KEY_ENV_VAR).ok())?;
        let mirror_enabled =
            managed_execution(env::var("CLOUD_RUN_JOB").ok(), env::var("K_SERVICE").ok());

        Ok(Self {
            cmc_api_key,
            log_path: PathBuf::from(LOG_FILE_NAME),
            bucket: MIRROR_BUCKET.to_string(),
            remote_object: LOG_FILE_NAME.to_string(),
            mirror_enabled,
        })
    }
}

fn resolve_api_key(raw: Option<String>) -> Result<String> {
    match raw {
        Some(key) if !key.is_empty() && key != API_KEY_PLACEHOLDER => Ok(key),
        _ => bail!("Set your CoinMarketCap API key in the {API_KEY_ENV_VAR} environment variable."),
    }
}

/// Cloud Run jobs set `CLOUD_RUN_JOB`, services set `K_SERVICE`; either one
/// being non-empty marks a managed execution environment.
fn managed_execution(job: Option<String>, service: Option<String>) -> bool {
    let set = |var: Option<String>| var.is_some_and(|value| !value.is_empty());
    set(job) || set(service)
}
