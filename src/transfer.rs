//! Asset transfer: staging downloads and glob-matched uploads.
//!
//! Downloads are streamed fully to a tag-scoped staging path before the
//! corresponding upload begins; there is no pass-through between the two.
//! Uploads expand local file patterns, skip directories and already-sent
//! paths, and wrap each attach call with the retry policy.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Result, SyncError};
use crate::provider::{AssetFetcher, ReleaseSink};
use crate::retry::with_retry;

/// Downloads remote assets into a local staging directory.
pub struct HttpFetcher {
    client: reqwest::Client,
    staging_root: PathBuf,
}

impl HttpFetcher {
    pub fn new(staging_root: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            staging_root: staging_root.into(),
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, tag: &str, filename: &str) -> Result<PathBuf> {
        let dir = self.staging_root.join(tag);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(filename);

        info!("prepare to download file {} from {}", path.display(), url);

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(SyncError::HttpStatus {
                code: status,
                message: format!("download failed for {url}"),
            });
        }

        let mut file = tokio::fs::File::create(&path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        info!("downloaded {}", path.display());
        Ok(path)
    }
}

/// Expand `patterns` against the local filesystem and attach every matched
/// file to `release_id`, returning the download URLs in upload order.
///
/// A pattern that matches nothing is a validation error and aborts the call
/// chain without retry. Directories are ignored; a path matched by more than
/// one pattern is uploaded once. Each attach call is individually retried
/// `max_retries` extra times with a fixed `backoff`.
pub async fn upload_matched<D>(
    sink: &D,
    release_id: u64,
    patterns: &[String],
    max_retries: u32,
    backoff: Duration,
) -> Result<Vec<String>>
where
    D: ReleaseSink + ?Sized,
{
    let mut uploaded = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for pattern in patterns {
        let pattern = pattern.trim();
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| SyncError::Validation(format!("invalid file pattern `{pattern}`: {e}")))?
            .filter_map(|entry| entry.ok())
            .collect();
        if matches.is_empty() {
            return Err(SyncError::Validation(format!(
                "file pattern does not match: {pattern}"
            )));
        }

        for path in matches {
            if path.is_dir() || !seen.insert(path.clone()) {
                continue;
            }
            let filename = file_name_of(&path)?;
            let url = with_retry(max_retries, backoff, SyncError::retry_class, || {
                sink.attach_asset(release_id, &path, filename)
            })
            .await?;
            info!("uploaded {} as {}", path.display(), url);
            uploaded.push(url);
        }
    }

    Ok(uploaded)
}

fn file_name_of(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SyncError::Validation(format!("invalid file name: {}", path.display())))
}
