//! StratSheet Runner: the collaborators around the pure pipeline.
//!
//! This crate builds on `stratsheet-core` to provide:
//! - A record source trait and the HTTP strategy-details client
//! - Fetch with retry and parallel fan-out across strategies
//! - File and remote-commit sinks
//! - TOML run configuration
//! - The `run` entry point used by the CLI

pub mod config;
pub mod fetch;
pub mod runner;
pub mod sink;
pub mod source;

pub use config::{CommitConfig, ConfigError, OutputConfig, RunConfig};
pub use fetch::{fetch_all, fetch_with_retry, FetchConfig};
pub use runner::{run, RunOutput};
pub use sink::{CommitRequest, FileSink, GitHubCommitSink, SinkError};
pub use source::{proxify, FetchError, NapbotsClient, RecordSource};
