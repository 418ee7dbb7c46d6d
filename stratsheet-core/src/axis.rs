//! Shared coordinate axes.
//!
//! Every entity reports quotes and trades on its own sparse set of dates. The
//! formatters need one common, sorted key set so that column `i` (or array
//! index `i`) means the same date for every entity.
//!
//! Keys are fixed-width zero-padded tags, so plain string order is
//! chronological order.

use std::collections::BTreeSet;

use crate::entity::NormalizedEntity;
use crate::options::{RenderOptions, Section};

/// A sorted, deduplicated key sequence. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Axis {
    keys: Vec<String>,
}

impl Axis {
    /// Union of all quote day tags, keeping only keys after `from_day`.
    pub fn quotes(entities: &[NormalizedEntity], from_day: Option<&str>) -> Self {
        let union: BTreeSet<&str> = entities
            .iter()
            .flat_map(|e| e.quotes.iter().map(|q| q.date_key.as_str()))
            .filter(|k| from_day.map_or(true, |cutoff| *k > cutoff))
            .collect();
        Self::from_sorted(union)
    }

    /// Union of all trade open (`…o`) and close (`…c`) tags.
    ///
    /// No cutoff here: it could separate a close from its open.
    pub fn trades(entities: &[NormalizedEntity]) -> Self {
        let union: BTreeSet<String> = entities
            .iter()
            .flat_map(|e| e.trades.iter())
            .flat_map(|t| [t.close_tag(), t.open_tag()])
            .collect();
        Self {
            keys: union.into_iter().collect(),
        }
    }

    fn from_sorted(set: BTreeSet<&str>) -> Self {
        Self {
            keys: set.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Index of a key, by binary search.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.binary_search_by(|k| k.as_str().cmp(key)).ok()
    }
}

/// Both axes for one run; each is empty when its sections are off.
#[derive(Debug, Clone, Default)]
pub struct Axes {
    pub quotes: Axis,
    pub trades: Axis,
}

impl Axes {
    pub fn build(entities: &[NormalizedEntity], opts: &RenderOptions) -> Self {
        let quotes = if opts.sections.needs_quote_axis() {
            Axis::quotes(entities, opts.from_day.as_deref())
        } else {
            Axis::default()
        };
        let trades = if opts.sections.contains(Section::Trades) {
            Axis::trades(entities)
        } else {
            Axis::default()
        };
        Self { quotes, trades }
    }
}
