//! relmirror - Release mirroring between git hosting platforms
//!
//! relmirror mirrors release metadata and binary assets from a GitHub
//! repository to a Gitee repository: missing releases are created, missing
//! assets are downloaded and re-uploaded, and work already done is skipped.
//! There is no persisted state between runs; each pass re-derives its plan
//! from both catalogs, so repeating a completed pass is a no-op and an
//! interrupted pass simply resumes on the next invocation.
//!
//! ## Modules
//!
//! - [`config`]: environment-driven configuration, validated before any
//!   network call
//! - [`reconcile`]: catalog diffing and plan execution
//! - [`retry`]: bounded, classified retry for remote calls
//! - [`github`] / [`gitee`]: the two platform clients
//! - [`transfer`]: staging downloads and glob-matched uploads
//! - [`output`]: machine-readable result signals

pub mod config;
pub mod error;
pub mod gitee;
pub mod github;
pub mod model;
pub mod output;
pub mod provider;
pub mod reconcile;
pub mod retry;
pub mod transfer;

pub use config::Config;
pub use error::SyncError;
pub use gitee::GiteeProvider;
pub use github::GitHubProvider;
pub use model::{AssetRecord, ReleaseRecord};
pub use output::OutputSink;
pub use provider::{AssetFetcher, ReleaseSink, ReleaseSource};
pub use reconcile::{reconcile, SyncAction, SyncEngine, SyncPlan, SyncSummary};
pub use retry::{with_retry, RetryClass};
pub use transfer::{upload_matched, HttpFetcher};
