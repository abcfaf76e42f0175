//! Remote mirror: push the latest log row to an object store, once.
//!
//! The mirror only ever appends the local log's final line, and only when
//! that exact line is not already present remotely, so repeated invocations
//! against the same log are idempotent.

pub mod gcs;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::store;

/// Text-object storage seam. Production uses the GCS client; tests use an
/// in-memory double.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn download_text(&self, object: &str) -> Result<String>;
    async fn upload_text(&self, object: &str, content: &str) -> Result<()>;
}

/// What `sync_last_row` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local log had no data rows (or no file at all); nothing to mirror.
    NoData,
    /// Remote object was absent or empty; created it from header + last row.
    Created,
    /// Last row already present remotely; no write performed.
    Duplicate,
    /// Last row appended to the existing remote content.
    Appended,
}

/// Mirror the local log's last data row to `object` in the remote store.
///
/// A failed download is treated like a missing object and rebuilds the
/// remote content from the local header + last row; remote-only history is
/// lost in that case. Upload failures propagate; the local log is already
/// durable and is never rolled back.
pub async fn sync_last_row<S>(remote: &S, local: &Path, object: &str) -> Result<SyncOutcome>
where
    S: RemoteStore + ?Sized,
{
    if !local.exists() {
        tracing::info!(path = %local.display(), "local log missing; nothing to mirror");
        return Ok(SyncOutcome::NoData);
    }

    let lines = store::read_lines(local)?;
    if lines.len() < 2 {
        tracing::info!("local log has no data rows to mirror");
        return Ok(SyncOutcome::NoData);
    }

    let header = &lines[0];
    let last = &lines[lines.len() - 1];

    let (content, outcome) = match remote.download_text(object).await {
        Ok(existing) if existing.trim().is_empty() => {
            (format!("{header}\n{last}\n"), SyncOutcome::Created)
        }
        Ok(existing) => {
            if existing.lines().any(|line| line == last) {
                tracing::info!(object, "last row already mirrored; skipping");
                return Ok(SyncOutcome::Duplicate);
            }
            let body = existing.trim_end_matches('\n');
            (format!("{body}\n{last}\n"), SyncOutcome::Appended)
        }
        Err(err) => {
            // An absent object and a failed read look the same from here;
            // both rebuild the remote file from the local header + last row.
            tracing::warn!(object, "remote read failed, recreating: {err:#}");
            (format!("{header}\n{last}\n"), SyncOutcome::Created)
        }
    };

    remote.upload_text(object, &content).await?;
    tracing::info!(object, bytes = content.len(), ?outcome, "mirrored last row");
    Ok(outcome)
}
