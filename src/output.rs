//! Machine-readable result signals for a calling orchestrator.
//!
//! Results are appended to the file named by `GITHUB_OUTPUT` as `key=value`
//! lines, or as a `key<<EOF` heredoc block when the value spans multiple
//! lines. Without a sink file the values are only logged.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;

/// Append-only sink for key/value result signals.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    /// Sink backed by the `GITHUB_OUTPUT` file if that variable is set,
    /// otherwise log-only.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Record `name=value`. Multi-line values are written as a heredoc
    /// block so the consumer can recover them intact.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        info!("result: {}={}", name, value);

        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if value.contains('\n') {
            writeln!(file, "{name}<<EOF\n{value}\nEOF")?;
        } else {
            writeln!(file, "{name}={value}")?;
        }
        Ok(())
    }
}
