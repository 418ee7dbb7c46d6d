//! Output sinks: local file and remote repository commit.
//!
//! Both take the final text as-is. Callers treat a sink error as a logged
//! warning: the in-memory result of a run never depends on a sink.

use std::path::PathBuf;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use stratsheet_core::date_codec::{self, StampPrecision};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("commit request failed: {0}")]
    Http(String),

    #[error("commit rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

// ─── File sink ──────────────────────────────────────────────────────

/// Writes the text to a path built from a template.
///
/// `%DATE%` expands to the UTC day stamp (`210816z`), `%DATETIME%` to the
/// UTC minute stamp (`210816-0130z`).
#[derive(Debug, Clone)]
pub struct FileSink {
    template: String,
}

impl FileSink {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The concrete path for a run at `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> PathBuf {
        let name = self
            .template
            .replace("%DATE%", &date_codec::day_stamp(now))
            .replace(
                "%DATETIME%",
                &date_codec::datetime_stamp(now, StampPrecision::Minutes),
            );
        PathBuf::from(name)
    }

    /// Write `text`, creating missing parent directories.
    pub fn write(&self, text: &str, now: DateTime<Utc>) -> Result<PathBuf, SinkError> {
        let path = self.resolve(now);
        let io_err = |source| SinkError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&path, text).map_err(io_err)?;
        info!(path = %path.display(), bytes = text.len(), "written");
        Ok(path)
    }
}

// ─── Commit sink ────────────────────────────────────────────────────

/// Name/email pair attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl CommitIdentity {
    fn anonymous() -> Self {
        Self {
            name: "-".into(),
            email: "-".into(),
        }
    }
}

/// Body of the contents-API `PUT`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRequest {
    pub message: String,
    pub committer: CommitIdentity,
    pub author: CommitIdentity,
    /// Current blob hash; omitted when the file does not exist yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Base64 of the new file content.
    pub content: String,
}

impl CommitRequest {
    pub fn new(text: &str, message: &str, sha: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            committer: CommitIdentity::anonymous(),
            author: CommitIdentity::anonymous(),
            sha,
            content: BASE64.encode(text.as_bytes()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BlobInfo {
    sha: Option<String>,
}

/// Read-modify-write of one file through a repository contents endpoint.
pub struct GitHubCommitSink {
    client: reqwest::blocking::Client,
    url: String,
    token: String,
}

impl GitHubCommitSink {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("stratsheet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current blob hash, then submit `text` on top of it.
    pub fn commit(&self, text: &str, message: &str) -> Result<(), SinkError> {
        let sha = self.current_sha()?;
        debug!(url = %self.url, sha = ?sha, "current blob");

        let body = CommitRequest::new(text, message, sha);
        let resp = self
            .client
            .put(&self.url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(AUTHORIZATION, format!("token {}", self.token))
            .json(&body)
            .send()
            .map_err(|e| SinkError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        info!(url = %self.url, message, "committed");
        Ok(())
    }

    /// Hash of the file as it is now; `None` when it does not exist.
    fn current_sha(&self) -> Result<Option<String>, SinkError> {
        let resp = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(AUTHORIZATION, format!("token {}", self.token))
            .send()
            .map_err(|e| SinkError::Http(e.to_string()))?;
        let blob: BlobInfo = resp.json().unwrap_or_default();
        Ok(blob.sha)
    }
}

/// Commit message for a document version, e.g. `v-210816-0130z`.
pub fn commit_message(version: Option<&str>) -> String {
    version.map(|v| format!("v-{v}")).unwrap_or_default()
}
