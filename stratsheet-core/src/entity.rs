//! Normalized per-strategy data, the common input of every formatter.

use serde::{Deserialize, Serialize};

/// The four fixed performance windows, as supplied by the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub y1: f64,
    pub m3: f64,
    pub m1: f64,
    pub w1: f64,
}

impl PerformanceSnapshot {
    /// Windows with their column labels, in sheet order.
    pub fn windows(&self) -> [(PerfWindow, f64); 4] {
        [
            (PerfWindow::Y1, self.y1),
            (PerfWindow::M3, self.m3),
            (PerfWindow::M1, self.m1),
            (PerfWindow::W1, self.w1),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfWindow {
    Y1,
    M3,
    M1,
    W1,
}

impl PerfWindow {
    /// Tab-separated header label.
    pub fn column_label(self) -> &'static str {
        match self {
            PerfWindow::Y1 => "pf-1Y",
            PerfWindow::M3 => "pf-3M",
            PerfWindow::M1 => "pf-1M",
            PerfWindow::W1 => "pf-1W",
        }
    }

    /// Document field name.
    pub fn key(self) -> &'static str {
        match self {
            PerfWindow::Y1 => "y1",
            PerfWindow::M3 => "m3",
            PerfWindow::M1 => "m1",
            PerfWindow::W1 => "w1",
        }
    }
}

/// Performance over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPerformance {
    /// `YYYY-MM`
    pub date_key: String,
    pub perf: f64,
}

impl MonthlyPerformance {
    /// `YYMM`, as used in document keys (`ym2103`).
    pub fn short_key(&self) -> String {
        match (self.date_key.get(2..4), self.date_key.get(5..7)) {
            (Some(yy), Some(mm)) => format!("{yy}{mm}"),
            _ => self.date_key.clone(),
        }
    }
}

/// A dated price and its day-over-day ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSample {
    /// Day tag `YYMMDD`.
    pub date_key: String,
    pub price: f64,
    /// `price / previous price`; exactly 1 for the first sample.
    pub factor: f64,
}

/// One completed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// 1-based, chronological.
    pub sequence_nr: usize,
    /// Datetime tag `YYMMDD-hhmmss`.
    pub open_key: String,
    pub close_key: String,
    /// Coin, e.g. `BTC`.
    pub instrument: String,
    pub target_exposure: f64,
    /// Invested part actually exposed, in `[-1, 1]`.
    pub actual_exposure: f64,
    pub open_price: f64,
    pub close_price: f64,
    pub perf: f64,
}

impl TradeEvent {
    /// Trade-axis tag of the open event.
    pub fn open_tag(&self) -> String {
        format!("{}o", self.open_key)
    }

    /// Trade-axis tag of the close event.
    pub fn close_tag(&self) -> String {
        format!("{}c", self.close_key)
    }
}

/// One strategy after normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEntity {
    pub name: String,
    pub code: String,
    pub drawdown: f64,
    pub performance: PerformanceSnapshot,
    pub monthly_performance: Vec<MonthlyPerformance>,
    pub quotes: Vec<QuoteSample>,
    pub trades: Vec<TradeEvent>,
}
