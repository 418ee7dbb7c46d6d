//! Retry and fan-out over a [`RecordSource`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stratsheet_core::{catalog, FetchOutcome};

use crate::source::{FetchError, RecordSource};

/// Fetch behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per entity before giving up.
    pub max_tries: u32,
    /// One concurrent request per entity.
    pub parallel: bool,
    /// Route requests through the translation proxy.
    pub proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_tries: 5,
            parallel: true,
            proxy: false,
        }
    }
}

/// Fetch one entity, retrying up to `max_tries` times with no delay.
///
/// The first success wins. Exhaustion yields [`FetchOutcome::Unavailable`],
/// never an error.
pub fn fetch_with_retry(source: &dyn RecordSource, name: &str, max_tries: u32) -> FetchOutcome {
    let Some(code) = catalog::code_for(name) else {
        let err = FetchError::UnknownStrategy {
            name: name.to_string(),
        };
        warn!(entity = name, error = %err, "not fetched");
        return FetchOutcome::Unavailable;
    };

    for attempt in 1..=max_tries {
        match source.fetch(name, code) {
            Ok(record) => return FetchOutcome::from(record),
            Err(e) => warn!(entity = name, attempt, error = %e, "fetch attempt failed"),
        }
    }
    FetchOutcome::Unavailable
}

/// Fetch every entity; results come back in `names` order once all settle.
pub fn fetch_all(
    source: &dyn RecordSource,
    names: &[String],
    config: &FetchConfig,
) -> Vec<(String, FetchOutcome)> {
    info!(
        source = source.name(),
        entities = names.len(),
        parallel = config.parallel,
        "fetching"
    );

    let fetch_one = |name: &String| {
        (
            name.clone(),
            fetch_with_retry(source, name, config.max_tries),
        )
    };
    let results: Vec<(String, FetchOutcome)> = if config.parallel {
        names.par_iter().map(fetch_one).collect()
    } else {
        names.iter().map(fetch_one).collect()
    };

    let available = results.iter().filter(|(_, o)| o.is_available()).count();
    info!(available, unavailable = results.len() - available, "fetch complete");
    results
}
