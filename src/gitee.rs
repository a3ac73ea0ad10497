//! Destination-side release provider backed by the Gitee v5 API.
//!
//! Creation is a form-encoded POST, attachment a multipart POST streaming
//! the staged file. Both report failures as values: non-2xx statuses carry
//! the platform's `message` field when present, and a 2xx body missing an
//! expected field is a distinct, named condition.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::model::ReleaseRecord;
use crate::provider::ReleaseSink;

const DEFAULT_BASE_URL: &str = "https://gitee.com/api/v5";

/// Read + create + attach client for the destination repository.
pub struct GiteeProvider {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
    debug: bool,
}

impl GiteeProvider {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, config)
    }

    /// Client pointed at an alternative API root, used by tests.
    pub fn with_base_url(base_url: impl Into<String>, config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            owner: config.gitee_owner.clone(),
            repo: config.gitee_repo.clone(),
            token: config.gitee_token.clone(),
            debug: config.debug,
        }
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/{}/releases", self.base_url, self.owner, self.repo)
    }

    /// Check the status, then hand back the parsed body.
    async fn into_checked_json(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        if self.debug {
            debug!("request {} , data: {}", url, body);
        }
        if !(200..300).contains(&status) {
            return Err(SyncError::from_status(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ReleaseSink for GiteeProvider {
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        let url = self.releases_url();
        let response = self
            .client
            .get(&url)
            .query(&[("access_token", self.token.as_str())])
            .send()
            .await?;
        let value = self.into_checked_json(&url, response).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create_release(
        &self,
        tag: &str,
        name: &str,
        body: &str,
        target_ref: &str,
    ) -> Result<u64> {
        let url = self.releases_url();
        let form = [
            ("access_token", self.token.as_str()),
            ("tag_name", tag),
            ("name", name),
            ("body", body),
            ("target_commitish", target_ref),
        ];
        let response = self.client.post(&url).form(&form).send().await?;
        let value = self.into_checked_json(&url, response).await?;
        value
            .get("id")
            .and_then(|id| id.as_u64())
            .ok_or(SyncError::MissingField("id"))
    }

    async fn attach_asset(&self, release_id: u64, path: &Path, filename: &str) -> Result<String> {
        let url = format!("{}/{}/attach_files", self.releases_url(), release_id);

        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let stream = FramedRead::new(file, BytesCodec::new());
        let part = Part::stream_with_length(Body::wrap_stream(stream), length)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .text("access_token", self.token.clone())
            .part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let value = self.into_checked_json(&url, response).await?;
        value
            .get("browser_download_url")
            .and_then(|u| u.as_str())
            .map(str::to_owned)
            .ok_or(SyncError::MissingField("browser_download_url"))
    }
}
