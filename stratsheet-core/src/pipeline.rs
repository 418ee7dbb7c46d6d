//! Pipeline entry point: fetched records → normalized entities → axes →
//! matrix or document → text.
//!
//! Pure and synchronous. Entities that are unavailable or fail to normalize
//! are dropped from every axis and output and reported in
//! [`PipelineOutput::skipped`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::axis::Axes;
use crate::date_codec::{self, StampPrecision};
use crate::document::format_document;
use crate::entity::NormalizedEntity;
use crate::normalize::normalize;
use crate::options::RenderOptions;
use crate::record::FetchOutcome;
use crate::serialize::{serialize, Rendered, SerializeError};
use crate::tabular::format_table;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] SerializeError),
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub entities: Vec<NormalizedEntity>,
    pub rendered: Rendered,
    pub text: String,
    /// Configured entities left out, in configured order.
    pub skipped: Vec<String>,
}

impl PipelineOutput {
    /// The document version, when the output is a document.
    pub fn version(&self) -> Option<&str> {
        match &self.rendered {
            Rendered::Document(doc) => Some(&doc.version),
            Rendered::Matrix(_) => None,
        }
    }
}

/// Run every pure stage over the fetched records.
///
/// `fetched` may be in any order; output follows `opts.entities`.
/// `generated_at` stamps the document version.
pub fn run_pipeline(
    fetched: &[(String, FetchOutcome)],
    opts: &RenderOptions,
    generated_at: DateTime<Utc>,
) -> Result<PipelineOutput, PipelineError> {
    let by_name: HashMap<&str, &FetchOutcome> =
        fetched.iter().map(|(n, o)| (n.as_str(), o)).collect();

    let mut entities = Vec::with_capacity(opts.entities.len());
    let mut skipped = Vec::new();
    for name in &opts.entities {
        let Some(record) = by_name.get(name.as_str()).and_then(|o| o.record()) else {
            warn!(entity = %name, "unavailable, skipping");
            skipped.push(name.clone());
            continue;
        };
        match normalize(name, record, opts) {
            Ok(entity) => entities.push(entity),
            Err(e) => {
                warn!(entity = %name, error = %e, "normalize failed, skipping");
                skipped.push(name.clone());
            }
        }
    }

    let axes = Axes::build(&entities, opts);
    info!(
        entities = entities.len(),
        skipped = skipped.len(),
        days = axes.quotes.len(),
        trade_events = axes.trades.len(),
        format = %opts.format,
        "rendering"
    );

    let rendered = if opts.format.is_document() {
        let version = date_codec::datetime_stamp(generated_at, StampPrecision::Minutes);
        Rendered::Document(format_document(&entities, &axes, opts, version))
    } else {
        Rendered::Matrix(format_table(&entities, &axes, opts))
    };
    let text = serialize(&rendered, opts.format)?;

    Ok(PipelineOutput {
        entities,
        rendered,
        text,
        skipped,
    })
}
