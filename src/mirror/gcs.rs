//! Google Cloud Storage backend for the remote mirror.
//!
//! Talks to the JSON API directly over reqwest, authorized by a bearer
//! token from the Cloud Run metadata server. That server only exists
//! inside the managed environment, which is also the only place the
//! mirror runs.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::mirror::RemoteStore;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const STORAGE_BASE: &str = "https://storage.googleapis.com/storage/v1/b";
const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1/b";

/// GCS-backed text object store for a single bucket.
#[derive(Debug, Clone)]
pub struct GcsClient {
    client: Client,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl GcsClient {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
        }
    }

    /// Service-account bearer token from the metadata server.
    async fn access_token(&self) -> Result<String> {
        let token: MetadataToken = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("gcs: metadata server request failed")?
            .error_for_status()
            .context("gcs: metadata server non-success status")?
            .json()
            .await
            .context("gcs: parse metadata token failed")?;
        Ok(token.access_token)
    }
}

fn media_url(bucket: &str, object: &str) -> Result<Url> {
    let mut url = Url::parse(STORAGE_BASE).expect("valid url");
    url.path_segments_mut()
        .map_err(|_| anyhow!("gcs: storage base url cannot carry segments"))?
        .extend([bucket, "o", object]);
    url.query_pairs_mut().append_pair("alt", "media");
    Ok(url)
}

fn upload_url(bucket: &str, object: &str) -> Result<Url> {
    let mut url = Url::parse(UPLOAD_BASE).expect("valid url");
    url.path_segments_mut()
        .map_err(|_| anyhow!("gcs: upload base url cannot carry segments"))?
        .extend([bucket, "o"]);
    {
        let mut qp = url.query_pairs_mut();
        qp.append_pair("uploadType", "media");
        qp.append_pair("name", object);
    }
    Ok(url)
}

#[async_trait]
impl RemoteStore for GcsClient {
    async fn download_text(&self, object: &str) -> Result<String> {
        let token = self.access_token().await?;
        let url = media_url(&self.bucket, object)?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .context("gcs: download request failed")?
            .error_for_status()
            .context("gcs: download non-success status")?;

        resp.text().await.context("gcs: read object body failed")
    }

    async fn upload_text(&self, object: &str, content: &str) -> Result<()> {
        let token = self.access_token().await?;
        let url = upload_url(&self.bucket, object)?;

        self.client
            .post(url)
            .bearer_auth(&token)
            .header("Content-Type", "text/csv")
            .body(content.to_string())
            .send()
            .await
            .context("gcs: upload request failed")?
            .error_for_status()
            .context("gcs: upload non-success status")?;
        Ok(())
    }
}
