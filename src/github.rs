//! Source-side release provider backed by the GitHub REST API.

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::model::ReleaseRecord;
use crate::provider::ReleaseSource;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("relmirror/", env!("CARGO_PKG_VERSION"));

/// Read-only client for the source repository's releases.
pub struct GitHubProvider {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    debug: bool,
}

impl GitHubProvider {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, config)
    }

    /// Client pointed at an alternative API root, used by tests.
    pub fn with_base_url(base_url: impl Into<String>, config: &Config) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            owner: config.github_owner.clone(),
            repo: config.github_repo.clone(),
            debug: config.debug,
        }
    }

    /// GET `url` and return the body once the status checks out.
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if self.debug {
            debug!("request {} , data: {}", url, body);
        }
        if !(200..300).contains(&status) {
            return Err(SyncError::from_status(status, &body));
        }
        Ok(body)
    }
}

#[async_trait]
impl ReleaseSource for GitHubProvider {
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        let url = format!("{}/repos/{}/{}/releases", self.base_url, self.owner, self.repo);
        let body = self.get_text(&url).await?;
        let releases: Vec<ReleaseRecord> = serde_json::from_str(&body)?;
        Ok(releases)
    }

    async fn release_detail(&self, id: u64) -> Result<ReleaseRecord> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}",
            self.base_url, self.owner, self.repo, id
        );
        let body = self.get_text(&url).await?;
        let release: ReleaseRecord = serde_json::from_str(&body)?;
        Ok(release)
    }

    async fn commit_message(&self, reference: &str) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.base_url, self.owner, self.repo, reference
        );
        let body = self.get_text(&url).await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        value
            .pointer("/commit/message")
            .and_then(|m| m.as_str())
            .map(str::to_owned)
            .ok_or(SyncError::MissingField("commit.message"))
    }
}
