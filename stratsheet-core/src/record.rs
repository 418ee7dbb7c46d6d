//! Raw strategy-details payload, as delivered by the upstream source.
//!
//! Only the fields the normalizer reads are modelled; everything else in the
//! payload is ignored by serde. Numbers that the source sometimes sends as
//! `null` are `Option<f64>` so a missing value is "falsy" instead of a parse
//! failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response envelope: `{ "success": true, "data": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<RawEntityRecord>,
}

impl RecordEnvelope {
    /// The record, if the source reported success and actually sent one.
    pub fn into_record(self) -> Option<RawEntityRecord> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// One strategy's details payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntityRecord {
    /// Display label; also the key of this strategy's own quote series.
    pub label: String,
    pub code: String,
    pub performance: RawPerformance,
    pub trades_info: RawTradesInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerformance {
    pub max_drawdown: f64,
    pub one_year_performance: f64,
    pub three_month_performance: f64,
    pub one_month_performance: f64,
    pub one_week_performance: f64,
    #[serde(default)]
    pub last12_month_perfs: Vec<RawMonthPerf>,
    /// Quote series keyed by label (the strategy plus any benchmarks).
    #[serde(default)]
    pub quotes: BTreeMap<String, Vec<RawQuote>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMonthPerf {
    pub year: i32,
    pub month: u32,
    pub perf: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    /// `YYYY-MM-DD`
    pub date: String,
    pub last: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTradesInfo {
    /// Most recent first.
    #[serde(default)]
    pub trades: Vec<RawTrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    /// e.g. `BTC-USDT`
    pub product: String,
    /// `YYYY-MM-DDThh:mm:ss`, UTC without zone designator.
    pub open_ts: String,
    pub close_ts: String,
    pub open: f64,
    pub close: f64,
    #[serde(default)]
    pub target_expo: Option<f64>,
    #[serde(default)]
    pub trade_perf: Option<f64>,
}

/// What the fetch layer hands to the pipeline for one requested entity.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Available(Box<RawEntityRecord>),
    /// Every attempt failed; the entity is dropped from all output.
    Unavailable,
}

impl FetchOutcome {
    pub fn record(&self) -> Option<&RawEntityRecord> {
        match self {
            FetchOutcome::Available(r) => Some(r),
            FetchOutcome::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FetchOutcome::Available(_))
    }
}

impl From<RawEntityRecord> for FetchOutcome {
    fn from(record: RawEntityRecord) -> Self {
        FetchOutcome::Available(Box::new(record))
    }
}
