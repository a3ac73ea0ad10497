use thiserror::Error;

use crate::retry::RetryClass;

/// Failure taxonomy for a sync pass.
///
/// Remote providers report failures as values of this type rather than
/// panicking; the reconciler decides per variant whether to abort the run,
/// skip the current asset, or hand the error to the retry policy.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required configuration setting is absent. Aborts before any
    /// network activity.
    #[error("required setting `{0}` is not set")]
    MissingConfig(&'static str),

    /// Local validation failed (e.g. a file pattern matched nothing).
    /// Fatal for the calling chain and excluded from retry.
    #[error("{0}")]
    Validation(String),

    /// The remote answered with a non-2xx status.
    #[error("HTTP status {code}: {message}")]
    HttpStatus { code: u16, message: String },

    /// Connection-level failure from the HTTP transport.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// Local file I/O failure (staging writes, output sink appends).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A successful response could not be decoded as JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful response is missing an expected field.
    #[error("response did not contain `{0}`")]
    MissingField(&'static str),
}

impl SyncError {
    /// Build an `HttpStatus` error from a non-2xx response body, preferring
    /// the platform's own `message` field when one is present.
    pub fn from_status(code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_else(|| format!("response status code: {code}"));
        SyncError::HttpStatus { code, message }
    }

    /// Whether this error must abort the whole run. Only configuration and
    /// validation errors qualify; everything else is scoped to the asset or
    /// release being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::MissingConfig(_) | SyncError::Validation(_))
    }

    /// Classification for the retry policy. Transient transport and remote
    /// failures are worth another attempt; validation failures and malformed
    /// success responses are not.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            SyncError::HttpStatus { .. }
            | SyncError::Network(_)
            | SyncError::Io(_)
            | SyncError::Decode(_) => RetryClass::Retryable,
            SyncError::MissingConfig(_)
            | SyncError::Validation(_)
            | SyncError::MissingField(_) => RetryClass::Fatal,
        }
    }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
