//! StratSheet Core: pure pipeline from strategy-details payloads to sheet text.
//!
//! Stages, each a synchronous transformation over immutable inputs:
//! - Entity normalizer: raw record → [`NormalizedEntity`]
//! - Axis builder: shared, sorted quote and trade axes
//! - Tabular formatter: fixed-width [`RenderedMatrix`]
//! - Document formatter: keyed [`RenderedDocument`]
//! - Text serializer: tab-separated, loose structured text, or JSON
//!
//! No network, no filesystem. Fetching and sinks live in `stratsheet-runner`.

pub mod axis;
pub mod catalog;
pub mod date_codec;
pub mod document;
pub mod encode;
pub mod entity;
pub mod normalize;
pub mod numfmt;
pub mod options;
pub mod pipeline;
pub mod record;
pub mod serialize;
pub mod tabular;

pub use axis::{Axes, Axis};
pub use document::{format_document, RenderedDocument};
pub use entity::NormalizedEntity;
pub use normalize::normalize;
pub use options::{MissingValue, OutputFormat, RenderOptions, Section, SectionSet};
pub use pipeline::{run_pipeline, PipelineError, PipelineOutput};
pub use record::{FetchOutcome, RawEntityRecord, RecordEnvelope};
pub use serialize::{serialize, Rendered};
pub use tabular::{format_table, RenderedMatrix};
