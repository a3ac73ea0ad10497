//! Capability traits the reconciler consumes.
//!
//! The core never talks HTTP directly: it sees a read-only source catalog, a
//! writable destination catalog, and an asset fetcher. The traits keep the
//! reconciler testable against mocks and the platform clients swappable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::ReleaseRecord;

/// Read-only view of the source platform's release catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// All releases, in the API's native order (typically newest-first).
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>>;

    /// One release with its authoritative asset list.
    async fn release_detail(&self, id: u64) -> Result<ReleaseRecord>;

    /// Commit message for a branch or SHA, used as the release-body
    /// fallback.
    async fn commit_message(&self, reference: &str) -> Result<String>;
}

/// Read + create + attach view of the destination platform's catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSink: Send + Sync {
    /// All releases currently present downstream.
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>>;

    /// Create a release and return its platform-assigned id.
    async fn create_release(
        &self,
        tag: &str,
        name: &str,
        body: &str,
        target_ref: &str,
    ) -> Result<u64>;

    /// Attach a local file to a release and return its download URL.
    async fn attach_asset(&self, release_id: u64, path: &Path, filename: &str) -> Result<String>;
}

/// Downloads a remote asset into local staging.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch `url` into the staging area under `{tag}/{filename}` and
    /// return the staged path. Any failure means "no file produced".
    async fn fetch(&self, url: &str, tag: &str, filename: &str) -> Result<PathBuf>;
}
