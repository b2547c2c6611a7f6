//! Snapshot fetching boundary and provider response classification.

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Exact body the provider returns while throttling. Matched verbatim;
/// close variants are not rate limits.
pub const RATE_LIMIT_SENTINEL: &str = "Try again later";

/// Message fragments produced by transport failures rather than by the
/// provider itself.
const NETWORK_ERROR_MARKERS: [&str; 4] =
    ["dns error", "error sending request", "connection", "timed out"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run fetch helper: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("fetch helper exited with code {code}: {stderr}")]
    Helper { code: i32, stderr: String },

    #[error("no fetch command configured")]
    NotConfigured,
}

/// What one raw response body turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// An XML document worth normalizing.
    Snapshot,
    /// The provider's throttle sentinel.
    RateLimited,
    /// Transport-level failure; the provider was never reached.
    NetworkFailure(String),
    /// Anything else the provider said (bad credentials, maintenance, ...).
    UnknownError(String),
}

/// Classify a raw response body or transport error message.
pub fn classify_response(body: &str) -> ResponseKind {
    if body.trim_start().starts_with('<') {
        return ResponseKind::Snapshot;
    }
    if body.trim() == RATE_LIMIT_SENTINEL {
        return ResponseKind::RateLimited;
    }
    let lowered = body.to_lowercase();
    if NETWORK_ERROR_MARKERS.iter().any(|m| lowered.contains(m)) {
        return ResponseKind::NetworkFailure(body.trim().to_string());
    }
    ResponseKind::UnknownError(body.trim().to_string())
}

/// Boundary for obtaining one raw snapshot document per account.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Fetch the raw charlist body for one credential pair.
    ///
    /// The returned string is unclassified; callers run it through
    /// [`classify_response`].
    async fn fetch_snapshot(&self, guid: &str, password: &str) -> Result<String, FetchError>;
}

/// Fetcher shelling out to an external helper command.
///
/// The helper receives guid and password as trailing arguments and prints
/// the raw response body on stdout. Keeping transport in a separate
/// process keeps credentials handling and HTTP details out of this crate.
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
}

impl CommandFetcher {
    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Result<Self, FetchError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(FetchError::NotConfigured)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl AccountFetcher for CommandFetcher {
    async fn fetch_snapshot(&self, guid: &str, password: &str) -> Result<String, FetchError> {
        tracing::debug!(helper = %self.program, guid, "invoking fetch helper");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(guid)
            .arg(password)
            .output()
            .await?;

        if !output.status.success() {
            return Err(FetchError::Helper {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
