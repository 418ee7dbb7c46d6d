//! Document formatter: nested key/value form of the sheet.
//!
//! Top-level fields, in output order:
//! - `v`: version, a UTC minute stamp
//! - `bots`: per-entity summary (`id`, `dd`, `y1`…`w1`, `ymYYMM`…)
//! - `days`: quote axis as numbers (dropped when transposed)
//! - `quotes` / `factors`: series aligned 1:1 with the axis
//! - `trades`: flat open/close event records, time-ordered

use std::cmp::Ordering;

use crate::axis::Axes;
use crate::entity::{NormalizedEntity, QuoteSample};
use crate::numfmt::{round_decimals, round_significant};
use crate::options::{MissingValue, RenderOptions, Section};

/// One position in a quote/factor series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f64),
    /// Missing sample rendered as an empty element.
    Blank,
}

impl Sample {
    fn present(value: Option<f64>, missing: MissingValue) -> Self {
        match (value, missing) {
            (Some(v), _) => Sample::Value(v),
            (None, MissingValue::Zero) => Sample::Value(0.0),
            (None, MissingValue::Empty) => Sample::Blank,
        }
    }
}

/// Which key the rows of a [`SeriesTable`] carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesLayout {
    /// Row per entity, column per axis day.
    ByEntity,
    /// Row per axis day, column per entity.
    ByDate,
}

/// A keyed matrix of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub layout: SeriesLayout,
    pub rows: Vec<(String, Vec<Sample>)>,
}

impl SeriesTable {
    /// Swap rows and columns; `column_keys` names the new rows.
    pub fn transpose(&self, column_keys: &[String]) -> SeriesTable {
        let rows = column_keys
            .iter()
            .enumerate()
            .map(|(j, key)| {
                let column = self
                    .rows
                    .iter()
                    .map(|(_, values)| values.get(j).copied().unwrap_or(Sample::Blank))
                    .collect();
                (key.clone(), column)
            })
            .collect();
        let layout = match self.layout {
            SeriesLayout::ByEntity => SeriesLayout::ByDate,
            SeriesLayout::ByDate => SeriesLayout::ByEntity,
        };
        SeriesTable { layout, rows }
    }

    pub fn row_keys(&self) -> Vec<String> {
        self.rows.iter().map(|(k, _)| k.clone()).collect()
    }
}

/// Per-entity summary: `{ id, dd?, y1?, m3?, m1?, w1?, ymYYMM?… }`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub id: String,
    /// Rounded numeric fields in output order.
    pub fields: Vec<(String, f64)>,
}

/// An open or close event of one trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    /// Datetime tag of the event.
    pub key: String,
    pub entity: String,
    pub instrument: String,
    /// Exposure to 2 significant digits.
    pub exposure: f64,
    /// Present on close records only.
    pub perf: Option<f64>,
}

impl TradeRecord {
    pub fn is_close(&self) -> bool {
        self.perf.is_some()
    }

    /// Record length as written: 5 for a close, 4 for an open.
    pub fn arity(&self) -> usize {
        if self.is_close() {
            5
        } else {
            4
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub version: String,
    pub entities: Vec<(String, EntitySummary)>,
    /// Absent when quotes/factors are off, or when transposed.
    pub axis: Option<Vec<u64>>,
    pub quotes: Option<SeriesTable>,
    pub factors: Option<SeriesTable>,
    pub trades: Option<Vec<TradeRecord>>,
}

/// Build the document for entities already in configured order.
pub fn format_document(
    entities: &[NormalizedEntity],
    axes: &Axes,
    opts: &RenderOptions,
    version: String,
) -> RenderedDocument {
    let sections = &opts.sections;

    let mut doc = RenderedDocument {
        version,
        entities: entities
            .iter()
            .map(|e| (e.name.clone(), summarize(e, opts)))
            .collect(),
        axis: None,
        quotes: None,
        factors: None,
        trades: None,
    };

    if sections.needs_quote_axis() {
        let days = axes.quotes.keys();
        let series = |pick: fn(&QuoteSample) -> f64, decimals: Option<usize>| SeriesTable {
            layout: SeriesLayout::ByEntity,
            rows: entities
                .iter()
                .map(|e| (e.name.clone(), align(e, days, pick, decimals, opts.missing)))
                .collect(),
        };

        if sections.contains(Section::Quotes) {
            doc.quotes = Some(series(|q: &QuoteSample| q.price, None));
        }
        if sections.contains(Section::Factors) {
            doc.factors = Some(series(|q: &QuoteSample| q.factor, Some(6)));
        }

        if opts.transpose {
            doc.quotes = doc.quotes.map(|t| t.transpose(days));
            doc.factors = doc.factors.map(|t| t.transpose(days));
        } else {
            doc.axis = Some(days.iter().filter_map(|d| d.parse().ok()).collect());
        }
    }

    if sections.contains(Section::Trades) {
        doc.trades = Some(trade_records(entities, opts));
    }

    doc
}

fn summarize(e: &NormalizedEntity, opts: &RenderOptions) -> EntitySummary {
    let mut fields = Vec::new();
    if opts.sections.contains(Section::Drawdown) {
        fields.push((
            "dd".to_string(),
            round_decimals(e.drawdown + opts.drawdown_shift(), 2),
        ));
    }
    if opts.sections.contains(Section::Performance) {
        let shift = opts.performance_shift();
        for (window, value) in e.performance.windows() {
            fields.push((window.key().to_string(), round_decimals(value + shift, 4)));
        }
        for m in &e.monthly_performance {
            fields.push((
                format!("ym{}", m.short_key()),
                round_decimals(m.perf + shift, 4),
            ));
        }
    }
    EntitySummary {
        id: e.code.clone(),
        fields,
    }
}

/// One sample per axis day. Zero values count as missing.
fn align(
    e: &NormalizedEntity,
    days: &[String],
    pick: fn(&QuoteSample) -> f64,
    decimals: Option<usize>,
    missing: MissingValue,
) -> Vec<Sample> {
    days.iter()
        .map(|day| {
            let value = e
                .quotes
                .binary_search_by(|q| q.date_key.as_str().cmp(day))
                .ok()
                .map(|i| pick(&e.quotes[i]))
                .filter(|v| *v != 0.0 && !v.is_nan())
                .map(|v| decimals.map_or(v, |d| round_decimals(v, d)));
            Sample::present(value, missing)
        })
        .collect()
}

/// Open and close records for every trade, sorted by event time.
///
/// Ties: close before open, then configured entity order.
fn trade_records(entities: &[NormalizedEntity], opts: &RenderOptions) -> Vec<TradeRecord> {
    let shift = opts.performance_shift();
    let mut records: Vec<TradeRecord> = Vec::new();
    for e in entities {
        for t in &e.trades {
            let exposure = round_significant(t.actual_exposure, 2);
            records.push(TradeRecord {
                key: t.open_key.clone(),
                entity: e.name.clone(),
                instrument: t.instrument.clone(),
                exposure,
                perf: None,
            });
            records.push(TradeRecord {
                key: t.close_key.clone(),
                entity: e.name.clone(),
                instrument: t.instrument.clone(),
                exposure,
                perf: Some(round_decimals(t.perf + shift, 8)),
            });
        }
    }
    records.sort_by(|a, b| compare_events(a, b, opts));
    records
}

fn compare_events(a: &TradeRecord, b: &TradeRecord, opts: &RenderOptions) -> Ordering {
    a.key
        .cmp(&b.key)
        .then_with(|| b.arity().cmp(&a.arity()))
        .then_with(|| opts.entity_rank(&a.entity).cmp(&opts.entity_rank(&b.entity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{MonthlyPerformance, PerformanceSnapshot, TradeEvent};
    use crate::options::SectionSet;

    fn entity(name: &str, quotes: &[(&str, f64)]) -> NormalizedEntity {
        let mut samples: Vec<QuoteSample> = Vec::new();
        for (day, price) in quotes {
            let factor = samples.last().map_or(1.0, |p| price / p.price);
            samples.push(QuoteSample {
                date_key: day.to_string(),
                price: *price,
                factor,
            });
        }
        NormalizedEntity {
            name: name.into(),
            code: format!("STRAT_{}", name.to_uppercase()),
            drawdown: -0.2,
            performance: PerformanceSnapshot {
                y1: 0.42,
                m3: 0.1,
                m1: -0.05,
                w1: 0.012345,
            },
            monthly_performance: vec![MonthlyPerformance {
                date_key: "2021-03".into(),
                perf: 0.12,
            }],
            quotes: samples,
            trades: vec![],
        }
    }

    fn trade(open: &str, close: &str, expo: f64, perf: f64) -> TradeEvent {
        TradeEvent {
            sequence_nr: 1,
            open_key: open.into(),
            close_key: close.into(),
            instrument: "BTC".into(),
            target_exposure: 1.0,
            actual_exposure: expo,
            open_price: 100.0,
            close_price: 110.0,
            perf,
        }
    }

    fn opts(sections: SectionSet) -> RenderOptions {
        RenderOptions {
            entities: vec!["cat".into(), "tige".into()],
            sections,
            ..Default::default()
        }
    }

    fn build(es: &[NormalizedEntity], o: &RenderOptions) -> RenderedDocument {
        format_document(es, &Axes::build(es, o), o, "210816-0130z".into())
    }

    #[test]
    fn summaries_are_rounded_and_shifted() {
        let es = vec![entity("cat", &[])];
        let doc = build(&es, &opts(SectionSet::default()));
        let (name, summary) = &doc.entities[0];
        assert_eq!(name, "cat");
        assert_eq!(summary.id, "STRAT_CAT");
        assert_eq!(
            summary.fields,
            vec![
                ("dd".to_string(), 0.8),
                ("y1".to_string(), 1.42),
                ("m3".to_string(), 1.1),
                ("m1".to_string(), 0.95),
                ("w1".to_string(), 1.0123),
                ("ym2103".to_string(), 1.12),
            ]
        );
    }

    #[test]
    fn summaries_without_sections_carry_only_id() {
        let es = vec![entity("cat", &[])];
        let doc = build(&es, &opts(SectionSet::empty()));
        assert!(doc.entities[0].1.fields.is_empty());
        assert!(doc.axis.is_none());
    }

    #[test]
    fn sparse_series_use_the_sentinel() {
        let es = vec![
            entity("cat", &[("210101", 100.0)]),
            entity("tige", &[("210102", 50.0)]),
        ];
        let doc = build(&es, &opts(SectionSet::empty().with(Section::Factors)));
        assert_eq!(doc.axis, Some(vec![210101, 210102]));
        let factors = doc.factors.unwrap();
        assert_eq!(factors.layout, SeriesLayout::ByEntity);
        assert_eq!(
            factors.rows,
            vec![
                ("cat".to_string(), vec![Sample::Value(1.0), Sample::Value(0.0)]),
                ("tige".to_string(), vec![Sample::Value(0.0), Sample::Value(1.0)]),
            ]
        );
        assert!(doc.quotes.is_none());
    }

    #[test]
    fn empty_sentinel_is_blank() {
        let es = vec![
            entity("cat", &[("210101", 100.0)]),
            entity("tige", &[("210102", 50.0)]),
        ];
        let o = RenderOptions {
            missing: MissingValue::Empty,
            ..opts(SectionSet::empty().with(Section::Quotes))
        };
        let quotes = build(&es, &o).quotes.unwrap();
        assert_eq!(quotes.rows[0].1, vec![Sample::Value(100.0), Sample::Blank]);
    }

    #[test]
    fn transpose_keys_by_day_and_drops_axis() {
        let es = vec![
            entity("cat", &[("210101", 100.0), ("210102", 110.0)]),
            entity("tige", &[("210102", 50.0)]),
        ];
        let o = RenderOptions {
            transpose: true,
            ..opts(SectionSet::empty().with(Section::Quotes))
        };
        let doc = build(&es, &o);
        assert!(doc.axis.is_none());
        let quotes = doc.quotes.unwrap();
        assert_eq!(quotes.layout, SeriesLayout::ByDate);
        assert_eq!(
            quotes.rows,
            vec![
                ("210101".to_string(), vec![Sample::Value(100.0), Sample::Value(0.0)]),
                ("210102".to_string(), vec![Sample::Value(110.0), Sample::Value(50.0)]),
            ]
        );
    }

    #[test]
    fn trade_records_sort_close_before_open_then_entity_order() {
        let mut tige = entity("tige", &[]);
        tige.trades = vec![trade("210302-100000", "210303-100000", 0.5, 0.05)];
        let mut cat = entity("cat", &[]);
        cat.trades = vec![
            trade("210301-100000", "210302-100000", -1.0, 0.1),
            trade("210302-100000", "210304-100000", 0.0213, 0.01),
        ];
        // Entity slice order differs from configured order on purpose.
        let es = vec![tige, cat];
        let doc = build(&es, &opts(SectionSet::empty().with(Section::Trades)));
        let trades = doc.trades.unwrap();

        let order: Vec<(&str, &str, bool)> = trades
            .iter()
            .map(|t| (t.key.as_str(), t.entity.as_str(), t.is_close()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("210301-100000", "cat", false),
                ("210302-100000", "cat", true),
                ("210302-100000", "cat", false),
                ("210302-100000", "tige", false),
                ("210303-100000", "tige", true),
                ("210304-100000", "cat", true),
            ]
        );
        assert_eq!(trades[1].perf, Some(1.1));
        assert_eq!(trades[2].exposure, 0.021);
    }

    #[test]
    fn transpose_twice_is_identity() {
        let table = SeriesTable {
            layout: SeriesLayout::ByEntity,
            rows: vec![
                ("cat".into(), vec![Sample::Value(1.0), Sample::Blank]),
                ("tige".into(), vec![Sample::Blank, Sample::Value(2.0)]),
            ],
        };
        let days = vec!["210101".to_string(), "210102".to_string()];
        let back = table.transpose(&days).transpose(&table.row_keys());
        assert_eq!(back, table);
    }
}
