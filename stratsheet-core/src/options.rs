//! Render options: one immutable value read by every pipeline stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog;

/// An optional block of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// 1Y / 3M / 1M / 1W windows plus the monthly history.
    Performance,
    Drawdown,
    Quotes,
    Factors,
    Trades,
}

/// The set of enabled sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionSet(BTreeSet<Section>);

impl SectionSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        [
            Section::Performance,
            Section::Drawdown,
            Section::Quotes,
            Section::Factors,
            Section::Trades,
        ]
        .into_iter()
        .collect()
    }

    pub fn with(mut self, section: Section) -> Self {
        self.0.insert(section);
        self
    }

    pub fn without(mut self, section: Section) -> Self {
        self.0.remove(&section);
        self
    }

    pub fn contains(&self, section: Section) -> bool {
        self.0.contains(&section)
    }

    /// Quotes or factors: both need the quote axis.
    pub fn needs_quote_axis(&self) -> bool {
        self.contains(Section::Quotes) || self.contains(Section::Factors)
    }

    pub fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        self.0.iter().copied()
    }
}

impl Default for SectionSet {
    fn default() -> Self {
        Self::empty()
            .with(Section::Performance)
            .with(Section::Drawdown)
            .with(Section::Factors)
    }
}

impl FromIterator<Section> for SectionSet {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How a missing quote/factor is written in document output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValue {
    #[default]
    Zero,
    Empty,
}

/// Final text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json5,
    Json,
}

impl OutputFormat {
    /// File extension, which is also the format's name.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json5 => "json5",
            OutputFormat::Json => "json",
        }
    }

    pub fn is_document(self) -> bool {
        !matches!(self, OutputFormat::Tsv)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tsv" => Ok(OutputFormat::Tsv),
            "json5" => Ok(OutputFormat::Json5),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown format '{other}'. Valid: tsv, json5, json"
            )),
        }
    }
}

/// Everything the normalize → align → render → serialize stages read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Entities to include, in output order.
    pub entities: Vec<String>,
    pub sections: SectionSet,
    /// Drawdown as a factor (0.71) instead of a change (-0.29).
    pub drawdown_as_factor: bool,
    /// Performance as a factor (1.42) instead of a change (0.42).
    pub performance_as_factor: bool,
    /// Day tag; quote-axis keys at or before it are dropped.
    pub from_day: Option<String>,
    /// Key quotes/factors by day instead of by entity.
    pub transpose: bool,
    pub missing: MissingValue,
    pub format: OutputFormat,
    /// Shift every quote date forward one day (upstream feed is a day early).
    pub fix_quote_dates: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            entities: catalog::default_order(),
            sections: SectionSet::default(),
            drawdown_as_factor: true,
            performance_as_factor: true,
            from_day: None,
            transpose: false,
            missing: MissingValue::Zero,
            format: OutputFormat::Tsv,
            fix_quote_dates: true,
        }
    }
}

impl RenderOptions {
    /// `1.0` when performance is shown as a factor, else `0.0`.
    pub fn performance_shift(&self) -> f64 {
        if self.performance_as_factor {
            1.0
        } else {
            0.0
        }
    }

    /// `1.0` when drawdown is shown as a factor, else `0.0`.
    pub fn drawdown_shift(&self) -> f64 {
        if self.drawdown_as_factor {
            1.0
        } else {
            0.0
        }
    }

    /// Position of an entity in the configured order.
    pub fn entity_rank(&self, name: &str) -> usize {
        self.entities
            .iter()
            .position(|n| n == name)
            .unwrap_or(usize::MAX)
    }
}
