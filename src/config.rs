use crate::error::{Result, SyncError};

/// Environment variable names, matching the action inputs this tool is
/// driven by.
const GITEE_OWNER: &str = "gitee_owner";
const GITEE_REPO: &str = "gitee_repo";
const GITEE_TOKEN: &str = "gitee_token";
const GITHUB_OWNER: &str = "github_owner";
const GITHUB_REPO: &str = "github_repo";
const DEBUG: &str = "debug";
const UPLOAD_RETRY_TIMES: &str = "gitee_upload_retry_times";

/// Process-wide immutable configuration, read once at startup.
///
/// Every required setting is validated before any network call; a missing
/// one is a fatal configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination repository owner.
    pub gitee_owner: String,
    /// Destination repository name.
    pub gitee_repo: String,
    /// Destination API token, passed through opaquely.
    pub gitee_token: String,
    /// Source repository owner.
    pub github_owner: String,
    /// Source repository name.
    pub github_repo: String,
    /// Gates verbose request/response logging.
    pub debug: bool,
    /// Extra attempts for each asset-attach call. Zero means no retry.
    pub upload_retry_times: u32,
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Lets tests
    /// avoid mutating process-global environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(SyncError::MissingConfig(key))
        };

        let debug = lookup(DEBUG)
            .map(|value| matches!(value.trim(), "1" | "true" | "True" | "yes"))
            .unwrap_or(false);

        // Non-numeric values fall back to no retry rather than failing.
        let upload_retry_times = lookup(UPLOAD_RETRY_TIMES)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Ok(Self {
            gitee_owner: required(GITEE_OWNER)?,
            gitee_repo: required(GITEE_REPO)?,
            gitee_token: required(GITEE_TOKEN)?,
            github_owner: required(GITHUB_OWNER)?,
            github_repo: required(GITHUB_REPO)?,
            debug,
            upload_retry_times,
        })
    }

    /// Token rendering safe for debug logs: the first few characters stay
    /// visible for identification, the remainder is masked.
    pub fn masked_token(&self) -> String {
        let visible = 9.min(self.gitee_token.len());
        let (head, tail) = self.gitee_token.split_at(visible);
        format!("{}{}", head, "*".repeat(tail.len()))
    }
}
