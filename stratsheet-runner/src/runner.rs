//! Run orchestration: fetch all → pipeline → sinks.
//!
//! A run fails only when the configuration is invalid or the pipeline cannot
//! serialize its output. Unavailable entities are skipped by the pipeline and
//! sink failures are logged.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use stratsheet_core::{run_pipeline, Rendered};

use crate::config::RunConfig;
use crate::fetch::fetch_all;
use crate::sink::{commit_message, FileSink, GitHubCommitSink};
use crate::source::RecordSource;

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rendered: Rendered,
    pub text: String,
    /// Configured entities left out of the output.
    pub skipped: Vec<String>,
    /// File written, when the file sink is enabled and succeeded.
    pub written_to: Option<PathBuf>,
    /// Whether the remote commit succeeded.
    pub committed: bool,
}

/// Execute one run against `source`, stamping output with `now`.
pub fn run(config: &RunConfig, source: &dyn RecordSource, now: DateTime<Utc>) -> Result<RunOutput> {
    config.validate().context("invalid run configuration")?;

    let fetched = fetch_all(source, &config.render.entities, &config.fetch);

    info!("calculating");
    let output = run_pipeline(&fetched, &config.render, now).context("pipeline failed")?;

    let written_to = match config.output.file.as_deref().filter(|f| !f.is_empty()) {
        Some(template) => match FileSink::new(template).write(&output.text, now) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "file sink failed");
                None
            }
        },
        None => None,
    };

    let committed = match &config.commit {
        Some(commit) => {
            info!(url = %commit.url, "uploading");
            let message = commit_message(output.version());
            let result = GitHubCommitSink::new(commit.url.as_str(), commit.token.as_str())
                .and_then(|sink| sink.commit(&output.text, &message));
            match result {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "commit sink failed");
                    false
                }
            }
        }
        None => false,
    };

    info!(
        bytes = output.text.len(),
        skipped = output.skipped.len(),
        "done"
    );
    Ok(RunOutput {
        rendered: output.rendered,
        text: output.text,
        skipped: output.skipped,
        written_to,
        committed,
    })
}
