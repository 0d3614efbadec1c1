//! Date coercion for `date` / `vintage_date` cells.
//!
//! Parsing never fails hard: a cell that cannot be read as a calendar date degrades to its
//! stringified form.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::types::Cell;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Coerce a non-null cell into `YYYY-MM-DD`, or its original text when it is not a date.
///
/// Returns `None` only for null cells.
pub fn coerce_date(cell: &Cell) -> Option<String> {
    let parsed = match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => parse_date_text(s),
        _ => None,
    };
    match parsed {
        Some(d) => Some(d.format("%Y-%m-%d").to_string()),
        None => cell.to_text(),
    }
}

/// Parse common textual date spellings found in economic spreadsheets.
///
/// Partial dates resolve to the first day of their period (`2023-04` and `2023Q2` both give
/// 2023-04-01, `2023` gives 2023-01-01).
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Partial periods first: chrono's `%Y` takes any digit count and a format space matches
    // none, so `%B %d %Y` would read `Jan 2023` as 20 January of year 23.
    if let Some(d) = parse_year_month(s)
        .or_else(|| parse_month_name_year(s))
        .or_else(|| parse_quarter(s))
        .or_else(|| parse_year(s))
    {
        return Some(d);
    }

    if let Some(d) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return four_digit_year(d.date());
    }

    // `%Y%m%d` would otherwise swallow a bare year.
    DATE_FORMATS
        .iter()
        .filter(|f| **f != "%Y%m%d" || s.len() == 8)
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(four_digit_year)
}

// Two-digit years (`1/2/23`) stay as text rather than landing in year 23.
fn four_digit_year(d: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&d.year()).then_some(d)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_year(s: &str) -> Option<NaiveDate> {
    if s.len() != 4 || !all_digits(s) {
        return None;
    }
    NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
}

// `2023-04`, `2023/04`
fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (y, m) = s.split_once(['-', '/'])?;
    if y.len() != 4 || !all_digits(y) || m.is_empty() || m.len() > 2 || !all_digits(m) {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
}

// `Jan 2023`, `January 2023`
fn parse_month_name_year(s: &str) -> Option<NaiveDate> {
    let (_, year) = s.rsplit_once(' ')?;
    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y").ok()
}

// `2023Q1`, `2023-Q1`, `2023 q1`
fn parse_quarter(s: &str) -> Option<NaiveDate> {
    let compact: String = s
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect::<String>()
        .to_ascii_uppercase();
    let (y, q) = compact.split_once('Q')?;
    if y.len() != 4 || !all_digits(y) || q.len() != 1 {
        return None;
    }
    let quarter: u32 = q.parse().ok()?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, (quarter - 1) * 3 + 1, 1)
}
