//! Entity normalizer: raw strategy payload → [`NormalizedEntity`].

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::date_codec::{self, DateCodecError};
use crate::entity::{
    MonthlyPerformance, NormalizedEntity, PerformanceSnapshot, QuoteSample, TradeEvent,
};
use crate::options::RenderOptions;
use crate::record::{RawEntityRecord, RawQuote, RawTrade};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no quote series under the record's own label '{label}'")]
    MissingQuoteSeries { label: String },

    #[error("bad quote date '{date}'")]
    QuoteDate { date: String },

    #[error("bad trade timestamp: {0}")]
    TradeTimestamp(#[from] DateCodecError),
}

/// Normalize one strategy record.
pub fn normalize(
    name: &str,
    record: &RawEntityRecord,
    opts: &RenderOptions,
) -> Result<NormalizedEntity, NormalizeError> {
    let pf = &record.performance;

    let raw_quotes = pf
        .quotes
        .get(&record.label)
        .ok_or_else(|| NormalizeError::MissingQuoteSeries {
            label: record.label.clone(),
        })?;

    let entity = NormalizedEntity {
        name: name.to_string(),
        code: record.code.clone(),
        drawdown: pf.max_drawdown,
        performance: PerformanceSnapshot {
            y1: pf.one_year_performance,
            m3: pf.three_month_performance,
            m1: pf.one_month_performance,
            w1: pf.one_week_performance,
        },
        monthly_performance: pf
            .last12_month_perfs
            .iter()
            .map(|m| MonthlyPerformance {
                date_key: format!("{}-{:02}", m.year, m.month),
                perf: m.perf,
            })
            .collect(),
        quotes: build_quotes(raw_quotes, opts.fix_quote_dates)?,
        trades: build_trades(&record.trades_info.trades)?,
    };

    debug!(
        entity = name,
        quotes = entity.quotes.len(),
        trades = entity.trades.len(),
        "normalized"
    );
    Ok(entity)
}

/// Price samples sorted by day, each with its day-over-day factor.
fn build_quotes(raw: &[RawQuote], fix_dates: bool) -> Result<Vec<QuoteSample>, NormalizeError> {
    let mut dated = raw
        .iter()
        .map(|q| Ok((quote_day_tag(&q.date, fix_dates)?, q.last)))
        .collect::<Result<Vec<(String, f64)>, NormalizeError>>()?;
    dated.sort_by(|a, b| a.0.cmp(&b.0));

    let mut quotes: Vec<QuoteSample> = Vec::with_capacity(dated.len());
    for (date_key, price) in dated {
        let factor = match quotes.last() {
            None => 1.0,
            Some(prev) => finite_or_zero(price / prev.price),
        };
        quotes.push(QuoteSample {
            date_key,
            price,
            factor,
        });
    }
    Ok(quotes)
}

fn quote_day_tag(date: &str, fix_dates: bool) -> Result<String, NormalizeError> {
    let bad = || NormalizeError::QuoteDate {
        date: date.to_string(),
    };
    let mut day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| bad())?;
    if fix_dates {
        day = day.succ_opt().ok_or_else(bad)?;
    }
    date_codec::day_tag(day).map_err(|_| bad())
}

/// Chronological trades, dropping those that carry no information.
fn build_trades(raw: &[RawTrade]) -> Result<Vec<TradeEvent>, NormalizeError> {
    raw.iter()
        .rev()
        .filter(|t| is_set(t.target_expo) && is_set(t.trade_perf) && t.close != t.open)
        .enumerate()
        .map(|(i, t)| {
            let perf = t.trade_perf.unwrap_or_default();
            Ok(TradeEvent {
                sequence_nr: i + 1,
                open_key: date_codec::to_compact(&t.open_ts, false)?,
                close_key: date_codec::to_compact(&t.close_ts, false)?,
                instrument: instrument(&t.product).to_string(),
                target_exposure: t.target_expo.unwrap_or_default(),
                actual_exposure: actual_exposure(perf, t.open, t.close),
                open_price: t.open,
                close_price: t.close,
                perf,
            })
        })
        .collect()
}

/// Fraction of capital exposed, derived from realized perf and price move.
///
/// `perf / (close/open - 1)`, clamped to `[-1, 1]`; 0 when not finite.
pub fn actual_exposure(perf: f64, open: f64, close: f64) -> f64 {
    finite_or_zero(perf / (close / open - 1.0)).clamp(-1.0, 1.0)
}

/// `BTC-USDT` → `BTC`.
fn instrument(product: &str) -> &str {
    product
        .strip_suffix("-USDT")
        .or_else(|| product.strip_suffix("-USD"))
        .unwrap_or(product)
}

fn is_set(v: Option<f64>) -> bool {
    matches!(v, Some(x) if x != 0.0 && !x.is_nan())
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}
