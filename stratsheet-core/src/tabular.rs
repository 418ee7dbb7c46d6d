//! Tabular formatter: fixed-width matrix, one header row plus one row per entity.
//!
//! Column groups, each present only when its section is enabled:
//!
//! | group       | header        | width | text                         |
//! |-------------|---------------|-------|------------------------------|
//! | name        | `name`        | 4     | left-justified, truncated    |
//! | code        | `code`        | 29    | left-justified, truncated    |
//! | performance | `pf-1Y` …     | 11    | 8 decimals                   |
//! | drawdown    | `dd`          | 5     | 2 decimals                   |
//! | months      | `pf-YYYY-MM`  | 11    | 8 decimals                   |
//! | quotes      | `q-YYMMDD`    | 14    | 4 decimals                   |
//! | factors     | `f-YYMMDD`    | 8     | 6 decimals                   |
//! | trades      | event tag     | 20    | trade token                  |
//!
//! A missing entity/key intersection is a blank, still padded, cell.

use std::collections::HashMap;

use crate::axis::Axes;
use crate::entity::{NormalizedEntity, PerfWindow, QuoteSample, TradeEvent};
use crate::numfmt::{fixed, pad_end, pad_start};
use crate::options::{RenderOptions, Section};

const NAME_WIDTH: usize = 4;
const CODE_WIDTH: usize = 29;
const PERF_WIDTH: usize = 11;
const DD_WIDTH: usize = 5;
const QUOTE_WIDTH: usize = 14;
const FACTOR_WIDTH: usize = 8;
const TRADE_WIDTH: usize = 20;

/// Rows of fixed-width text cells, header first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedMatrix {
    pub rows: Vec<Vec<String>>,
}

impl RenderedMatrix {
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Entity rows (everything after the header).
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// One output column.
#[derive(Debug, Clone, Copy)]
enum Column<'a> {
    Name,
    Code,
    Performance(PerfWindow),
    Drawdown,
    Month(&'a str),
    Quote(&'a str),
    Factor(&'a str),
    Trade(&'a str),
}

/// Build the matrix for the given entities (already in configured order).
pub fn format_table(
    entities: &[NormalizedEntity],
    axes: &Axes,
    opts: &RenderOptions,
) -> RenderedMatrix {
    let layout = layout(entities, axes, opts);

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(entities.len() + 1);
    rows.push(layout.iter().map(|c| header_cell(*c)).collect());
    for entity in entities {
        let lookup = EntityLookup::new(entity);
        rows.push(
            layout
                .iter()
                .map(|c| lookup.cell(*c, opts))
                .collect(),
        );
    }
    RenderedMatrix { rows }
}

fn layout<'a>(
    entities: &'a [NormalizedEntity],
    axes: &'a Axes,
    opts: &RenderOptions,
) -> Vec<Column<'a>> {
    let sections = &opts.sections;
    let mut cols = vec![Column::Name, Column::Code];

    if sections.contains(Section::Performance) {
        cols.extend(
            [PerfWindow::Y1, PerfWindow::M3, PerfWindow::M1, PerfWindow::W1]
                .into_iter()
                .map(Column::Performance),
        );
    }
    if sections.contains(Section::Drawdown) {
        cols.push(Column::Drawdown);
    }
    if sections.contains(Section::Performance) {
        // Month columns follow the first entity's history.
        if let Some(first) = entities.first() {
            cols.extend(
                first
                    .monthly_performance
                    .iter()
                    .map(|m| Column::Month(m.date_key.as_str())),
            );
        }
    }
    if sections.contains(Section::Quotes) {
        cols.extend(axes.quotes.iter().map(Column::Quote));
    }
    if sections.contains(Section::Factors) {
        cols.extend(axes.quotes.iter().map(Column::Factor));
    }
    if sections.contains(Section::Trades) {
        cols.extend(axes.trades.iter().map(Column::Trade));
    }
    cols
}

fn header_cell(col: Column<'_>) -> String {
    match col {
        Column::Name => pad_end("name", NAME_WIDTH),
        Column::Code => pad_end("code", CODE_WIDTH),
        Column::Performance(w) => pad_start(w.column_label(), PERF_WIDTH),
        Column::Drawdown => pad_start("dd", DD_WIDTH),
        Column::Month(key) => pad_start(&format!("pf-{key}"), PERF_WIDTH),
        Column::Quote(key) => pad_start(&format!("q-{key}"), QUOTE_WIDTH),
        Column::Factor(key) => pad_start(&format!("f-{key}"), FACTOR_WIDTH),
        Column::Trade(key) => pad_start(key, TRADE_WIDTH),
    }
}

/// Per-entity key lookups, built once per row.
struct EntityLookup<'a> {
    entity: &'a NormalizedEntity,
    months: HashMap<&'a str, f64>,
    quotes: HashMap<&'a str, &'a QuoteSample>,
    closes: HashMap<String, &'a TradeEvent>,
    opens: HashMap<String, &'a TradeEvent>,
}

impl<'a> EntityLookup<'a> {
    fn new(entity: &'a NormalizedEntity) -> Self {
        let mut closes = HashMap::new();
        let mut opens = HashMap::new();
        // First trade wins on a shared tag.
        for t in &entity.trades {
            closes.entry(t.close_tag()).or_insert(t);
            opens.entry(t.open_tag()).or_insert(t);
        }
        Self {
            entity,
            months: entity
                .monthly_performance
                .iter()
                .map(|m| (m.date_key.as_str(), m.perf))
                .collect(),
            quotes: entity
                .quotes
                .iter()
                .map(|q| (q.date_key.as_str(), q))
                .collect(),
            closes,
            opens,
        }
    }

    fn cell(&self, col: Column<'_>, opts: &RenderOptions) -> String {
        let e = self.entity;
        let pf_shift = opts.performance_shift();
        match col {
            Column::Name => pad_end(&e.name, NAME_WIDTH),
            Column::Code => pad_end(&e.code, CODE_WIDTH),
            Column::Performance(w) => {
                let value = match w {
                    PerfWindow::Y1 => e.performance.y1,
                    PerfWindow::M3 => e.performance.m3,
                    PerfWindow::M1 => e.performance.m1,
                    PerfWindow::W1 => e.performance.w1,
                };
                fixed(value + pf_shift, 8, PERF_WIDTH)
            }
            Column::Drawdown => fixed(e.drawdown + opts.drawdown_shift(), 2, DD_WIDTH),
            Column::Month(key) => match self.months.get(key) {
                Some(perf) => fixed(perf + pf_shift, 8, PERF_WIDTH),
                None => pad_start("", PERF_WIDTH),
            },
            Column::Quote(key) => {
                let text = self
                    .quotes
                    .get(key)
                    .map(|q| fixed(q.price, 4, 0))
                    .unwrap_or_default();
                pad_start(&text, QUOTE_WIDTH)
            }
            Column::Factor(key) => {
                let text = self
                    .quotes
                    .get(key)
                    .map(|q| fixed(q.factor, 6, 0))
                    .unwrap_or_default();
                pad_start(&text, FACTOR_WIDTH)
            }
            Column::Trade(key) => pad_start(&self.trade_token(key), TRADE_WIDTH),
        }
    }

    /// `BTCc  -1  0.100000` for a close, `BTCo   1` for an open, else empty.
    ///
    /// Zero-exposure trades render blank. The close token is tried first; an
    /// open token only fills a still-empty cell.
    fn trade_token(&self, key: &str) -> String {
        let mut token = String::new();
        if let Some(t) = self.closes.get(key).filter(|t| t.actual_exposure != 0.0) {
            token = format!(
                "{}c{}{}",
                t.instrument,
                fixed(t.actual_exposure, 0, 4),
                fixed(t.perf, 6, 10)
            );
        }
        if token.is_empty() {
            if let Some(t) = self.opens.get(key).filter(|t| t.actual_exposure != 0.0) {
                token = format!("{}o{}", t.instrument, fixed(t.actual_exposure, 0, 4));
            }
        }
        token
    }
}
