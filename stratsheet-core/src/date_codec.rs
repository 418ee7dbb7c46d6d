//! Compact date tags.
//!
//! The sheet uses fixed-width, zero-padded tags instead of ISO timestamps so
//! that lexicographic order equals chronological order:
//!
//! - day tag: `YYMMDD` (e.g. `210320`)
//! - datetime tag: `YYMMDD-hhmmss` (e.g. `210320-233004`)
//!
//! Tags are always in UTC and the century is always 20xx.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateCodecError {
    #[error("not an ISO timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("not a compact date tag: '{0}'")]
    InvalidTag(String),

    #[error("year {0} cannot be written as a 20xx tag")]
    CenturyOutOfRange(i32),
}

/// Precision of a "now" datetime stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampPrecision {
    Minutes,
    Seconds,
}

/// Convert `YYYY-MM-DDThh:mm:ssZ` into `YYMMDD-hhmmss`.
///
/// A date-only `YYYY-MM-DD` input is read as midnight, and the trailing `Z`
/// may be omitted. With `day_only`, a midnight result collapses to the
/// six-character day tag.
pub fn to_compact(iso: &str, day_only: bool) -> Result<String, DateCodecError> {
    let trimmed = iso.strip_suffix('Z').unwrap_or(iso);

    let datetime = if trimmed.len() == 10 {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|d| d.and_time(NaiveTime::default()))
            .map_err(|_| DateCodecError::InvalidTimestamp(iso.to_string()))?
    } else {
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| DateCodecError::InvalidTimestamp(iso.to_string()))?
    };

    compact_from_datetime(datetime, day_only)
}

/// Convert a `YYMMDD` or `YYMMDD-hhmmss` tag back into `YYYY-MM-DDThh:mm:ssZ`.
pub fn to_iso(tag: &str) -> Result<String, DateCodecError> {
    let invalid = || DateCodecError::InvalidTag(tag.to_string());

    let (day, time) = match tag.len() {
        6 => (tag, None),
        13 if tag.is_ascii() && tag.as_bytes()[6] == b'-' => (&tag[..6], Some(&tag[7..])),
        _ => return Err(invalid()),
    };

    let date = parse_day(day).ok_or_else(invalid)?;
    let time = match time {
        None => NaiveTime::default(),
        Some(t) => {
            let [h, m, s] = split_pairs::<3>(t).ok_or_else(invalid)?;
            NaiveTime::from_hms_opt(h, m, s).ok_or_else(invalid)?
        }
    };

    Ok(date
        .and_time(time)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string())
}

/// Day tag for a calendar date, e.g. 2021-03-20 → `210320`.
pub fn day_tag(date: NaiveDate) -> Result<String, DateCodecError> {
    check_century(date.year())?;
    Ok(format!(
        "{:02}{:02}{:02}",
        date.year() - 2000,
        date.month(),
        date.day()
    ))
}

/// UTC day stamp used for `%DATE%` in output filenames, e.g. `210816z`.
pub fn day_stamp(now: DateTime<Utc>) -> String {
    now.format("%y%m%dz").to_string()
}

/// UTC datetime stamp, e.g. `210816-0130z` (minutes) or `210816-013005z` (seconds).
///
/// Used for `%DATETIME%` in output filenames and as the document version.
pub fn datetime_stamp(now: DateTime<Utc>, precision: StampPrecision) -> String {
    match precision {
        StampPrecision::Minutes => now.format("%y%m%d-%H%Mz").to_string(),
        StampPrecision::Seconds => now.format("%y%m%d-%H%M%Sz").to_string(),
    }
}

/// Parse a `YYMMDD` day tag into a date.
pub fn parse_day_tag(tag: &str) -> Result<NaiveDate, DateCodecError> {
    parse_day(tag).ok_or_else(|| DateCodecError::InvalidTag(tag.to_string()))
}

fn compact_from_datetime(dt: NaiveDateTime, day_only: bool) -> Result<String, DateCodecError> {
    let day = day_tag(dt.date())?;
    if day_only && dt.time() == NaiveTime::default() {
        return Ok(day);
    }
    Ok(format!(
        "{day}-{:02}{:02}{:02}",
        dt.hour(),
        dt.minute(),
        dt.second()
    ))
}

fn check_century(year: i32) -> Result<(), DateCodecError> {
    if (2000..2100).contains(&year) {
        Ok(())
    } else {
        Err(DateCodecError::CenturyOutOfRange(year))
    }
}

fn parse_day(tag: &str) -> Option<NaiveDate> {
    let [yy, mm, dd] = split_pairs::<3>(tag)?;
    NaiveDate::from_ymd_opt(2000 + yy as i32, mm, dd)
}

/// Split a string of exactly `2 * N` ASCII digits into `N` two-digit numbers.
fn split_pairs<const N: usize>(s: &str) -> Option<[u32; N]> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 * N || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut out = [0u32; N];
    for (i, pair) in bytes.chunks(2).enumerate() {
        out[i] = u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0');
    }
    Some(out)
}
