//! Run configuration, loadable from TOML.
//!
//! ```toml
//! [render]
//! entities = ["cat", "tige"]
//! sections = ["performance", "drawdown", "factors"]
//! format = "json"
//!
//! [fetch]
//! max_tries = 5
//! parallel = true
//!
//! [output]
//! file = "./%DATETIME%-stratData.json"
//!
//! [commit]
//! url = "https://api.github.com/repos/mapbots/data/contents/strats.json"
//! token = "..."
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stratsheet_core::{catalog, date_codec, RenderOptions};

use crate::fetch::FetchConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid from_day '{0}': expected a YYMMDD day tag")]
    InvalidCutoff(String),

    #[error("max_tries must be at least 1")]
    NoAttempts,

    #[error("commit needs a token")]
    MissingToken,
}

/// Where the final text goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File template with optional `%DATE%` / `%DATETIME%`. `None` or an
    /// empty string disables the file sink.
    pub file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: Some("./stratSheet.tsv".to_string()),
        }
    }
}

/// Remote repository file to commit the text to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitConfig {
    pub url: String,
    pub token: String,
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub render: RenderOptions,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub commit: Option<CommitConfig>,
}

impl RunConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string. Omitted fields keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(unknown) = self
            .render
            .entities
            .iter()
            .find(|n| catalog::code_for(n).is_none())
        {
            return Err(ConfigError::UnknownStrategy(unknown.clone()));
        }
        if let Some(day) = &self.render.from_day {
            date_codec::parse_day_tag(day).map_err(|_| ConfigError::InvalidCutoff(day.clone()))?;
        }
        if self.fetch.max_tries == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if self.commit.as_ref().is_some_and(|c| c.token.is_empty()) {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}
