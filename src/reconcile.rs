//! Reconciliation engine.
//!
//! Compares the source and destination release catalogs keyed by tag,
//! derives the minimal plan of create/transfer actions, and executes it
//! sequentially. There is no persisted completion ledger: every pass
//! re-derives its plan from both remotes' current catalogs, which is what
//! makes repeated runs idempotent and interrupted runs resumable.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::model::ReleaseRecord;
use crate::output::OutputSink;
use crate::provider::{AssetFetcher, ReleaseSink, ReleaseSource};
use crate::transfer::upload_matched;

/// One step of a sync plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// The tag is absent downstream; create the release there.
    CreateRelease {
        tag: String,
        name: String,
        /// Raw source body. Empty bodies are resolved at execution time
        /// (commit-message fallback, then `"-"`).
        body: String,
        target_ref: String,
    },
    /// The asset exists at the source but not at the destination.
    TransferAsset {
        tag: String,
        filename: String,
        download_url: String,
        /// Destination release id when the release pre-exists; `None` means
        /// it is created earlier in the same plan.
        dest_release_id: Option<u64>,
    },
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::CreateRelease { tag, .. } => write!(f, "create release {tag}"),
            SyncAction::TransferAsset { tag, filename, .. } => {
                write!(f, "transfer {filename} -> {tag}")
            }
        }
    }
}

/// Ordered list of actions for one repository pair.
pub type SyncPlan = Vec<SyncAction>;

/// Compute the plan that brings `dest` up to date with `source`.
///
/// Source order is preserved, never re-sorted. Releases without a tag are
/// excluded entirely. Assets are matched by filename; assets without a
/// download URL are skipped silently (the source may carry metadata-only
/// entries). Running this against catalogs that already agree yields an
/// empty plan.
pub fn reconcile(source: &[ReleaseRecord], dest: &[ReleaseRecord]) -> SyncPlan {
    let dest_by_tag: HashMap<&str, &ReleaseRecord> = dest
        .iter()
        .filter_map(|release| release.tag_name.as_deref().map(|tag| (tag, release)))
        .collect();

    let mut plan = Vec::new();

    for release in source {
        let Some(tag) = release.tag_name.as_deref() else {
            debug!("skipping source release without tag_name");
            continue;
        };

        let existing = dest_by_tag.get(tag).copied();
        if existing.is_none() {
            plan.push(SyncAction::CreateRelease {
                tag: tag.to_owned(),
                name: release.name.clone().unwrap_or_else(|| tag.to_owned()),
                body: release.body.clone().unwrap_or_default(),
                target_ref: release
                    .target_commitish
                    .clone()
                    .unwrap_or_else(|| "master".to_owned()),
            });
        }

        let dest_assets = existing.map(|r| r.asset_index()).unwrap_or_default();
        for asset in &release.assets {
            if dest_assets.contains_key(asset.name.as_str()) {
                continue;
            }
            let Some(url) = asset.browser_download_url.clone() else {
                continue;
            };
            plan.push(SyncAction::TransferAsset {
                tag: tag.to_owned(),
                filename: asset.name.clone(),
                download_url: url,
                dest_release_id: existing.and_then(|r| r.id),
            });
        }
    }

    plan
}

/// Results of one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub releases_created: usize,
    pub releases_failed: usize,
    pub assets_transferred: usize,
    pub assets_failed: usize,
    pub duration: Duration,
}

/// Drives a plan against the providers, one release and one asset at a
/// time. Sequential on purpose: the destination must observe a just-created
/// release id before its assets upload, and racing creation could duplicate
/// releases.
pub struct SyncEngine<S, D, F> {
    source: S,
    dest: D,
    fetcher: F,
    output: OutputSink,
    upload_retries: u32,
    backoff: Duration,
}

impl<S, D, F> SyncEngine<S, D, F>
where
    S: ReleaseSource,
    D: ReleaseSink,
    F: AssetFetcher,
{
    pub fn new(
        source: S,
        dest: D,
        fetcher: F,
        output: OutputSink,
        upload_retries: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            source,
            dest,
            fetcher,
            output,
            upload_retries,
            backoff,
        }
    }

    /// Fetch both catalogs and compute the pending plan without executing
    /// anything.
    pub async fn plan(&self) -> Result<SyncPlan> {
        let source_catalog = self.source_catalog().await?;
        let dest_catalog = self.dest.list_releases().await?;
        info!(
            "comparing {} source release(s) against {} destination release(s)",
            source_catalog.len(),
            dest_catalog.len()
        );
        Ok(reconcile(&source_catalog, &dest_catalog))
    }

    /// One full reconciliation pass: plan, then execute.
    pub async fn run(&self) -> Result<SyncSummary> {
        let start = Instant::now();
        let plan = self.plan().await?;
        info!("sync plan contains {} action(s)", plan.len());

        let mut summary = self.execute(plan).await?;
        summary.duration = start.elapsed();

        info!(
            "sync completed in {:.2}s: {} release(s) created, {} asset(s) transferred, {} failed",
            summary.duration.as_secs_f64(),
            summary.releases_created,
            summary.assets_transferred,
            summary.releases_failed + summary.assets_failed
        );
        Ok(summary)
    }

    /// The source catalog with authoritative asset lists: the listing gives
    /// the order, the per-release detail fetch gives the assets. A failed
    /// detail fetch falls back to the listing's own data.
    async fn source_catalog(&self) -> Result<Vec<ReleaseRecord>> {
        let listed = self.source.list_releases().await?;
        let mut catalog = Vec::with_capacity(listed.len());

        for release in listed {
            match release.id {
                Some(id) if release.tag_name.is_some() => {
                    match self.source.release_detail(id).await {
                        Ok(detail) => catalog.push(detail),
                        Err(e) => {
                            warn!("detail fetch failed for release {}: {}", id, e);
                            catalog.push(release);
                        }
                    }
                }
                _ => catalog.push(release),
            }
        }

        Ok(catalog)
    }

    /// Execute the plan in order. A failed creation skips that release's
    /// transfers; a failed download or a definitively failed upload skips
    /// that one asset. Only fatal validation errors abort the pass.
    async fn execute(&self, plan: SyncPlan) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();
        let mut created_ids: HashMap<String, u64> = HashMap::new();
        let mut transferred_urls: Vec<String> = Vec::new();

        for action in plan {
            match action {
                SyncAction::CreateRelease {
                    tag,
                    name,
                    body,
                    target_ref,
                } => {
                    let body = self.resolve_body(&body, &target_ref).await;
                    match self
                        .dest
                        .create_release(&tag, &name, &body, &target_ref)
                        .await
                    {
                        Ok(id) => {
                            info!("create releases success , release_id is {}", id);
                            self.output.set("release-id", &id.to_string())?;
                            created_ids.insert(tag, id);
                            summary.releases_created += 1;
                        }
                        Err(e) => {
                            error!("create release failed for {}: {}", tag, e);
                            summary.releases_failed += 1;
                        }
                    }
                }
                SyncAction::TransferAsset {
                    tag,
                    filename,
                    download_url,
                    dest_release_id,
                } => {
                    let Some(release_id) =
                        dest_release_id.or_else(|| created_ids.get(&tag).copied())
                    else {
                        // Creation failed earlier in this pass; the next run
                        // re-derives these transfers.
                        warn!("no destination release for {}, skipping {}", tag, filename);
                        summary.assets_failed += 1;
                        continue;
                    };

                    let staged = match self.fetcher.fetch(&download_url, &tag, &filename).await {
                        Ok(path) => path,
                        Err(e) => {
                            warn!("{} not transferred: download failed: {}", filename, e);
                            summary.assets_failed += 1;
                            continue;
                        }
                    };

                    let pattern = staged.to_string_lossy().into_owned();
                    match upload_matched(
                        &self.dest,
                        release_id,
                        &[pattern],
                        self.upload_retries,
                        self.backoff,
                    )
                    .await
                    {
                        Ok(urls) => {
                            transferred_urls.extend(urls);
                            summary.assets_transferred += 1;
                        }
                        Err(e) if e.is_fatal() => {
                            // Assets uploaded earlier in this pass are still
                            // reported before the abort.
                            self.emit_download_urls(&transferred_urls)?;
                            return Err(e);
                        }
                        Err(e) => {
                            warn!("{} not transferred: upload failed: {}", filename, e);
                            summary.assets_failed += 1;
                        }
                    }
                }
            }
        }

        self.emit_download_urls(&transferred_urls)?;

        Ok(summary)
    }

    fn emit_download_urls(&self, urls: &[String]) -> Result<()> {
        if urls.is_empty() {
            return Ok(());
        }
        self.output.set("download-url", &urls.join("\n"))
    }

    /// Body resolution for a new release: the source body when non-empty,
    /// else the commit message of the target ref, else `"-"`. The lookup is
    /// best-effort and never fails the creation.
    async fn resolve_body(&self, body: &str, target_ref: &str) -> String {
        if !body.trim().is_empty() {
            return body.to_owned();
        }
        match self.source.commit_message(target_ref).await {
            Ok(message) if !message.trim().is_empty() => message,
            Ok(_) => "-".to_owned(),
            Err(e) => {
                debug!("commit message lookup failed for {}: {}", target_ref, e);
                "-".to_owned()
            }
        }
    }
}
