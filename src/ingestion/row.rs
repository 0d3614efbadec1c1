//! Per-row validation and type coercion.
//!
//! [`coerce_row`] is a pure function: one row in, at most one [`Observation`] plus its
//! [`Warning`]s out. The order of checks decides which warning fires for a defective row:
//!
//! 1. missing `series` drops the row
//! 2. missing `date` drops the row; otherwise parsed to `YYYY-MM-DD` or kept verbatim
//! 3. missing `value` warns but keeps the row
//! 4. `vintage_date` is optional and parsed like `date`
//! 5. descriptive columns are copied through (`country` falls back to `region`)
//! 6. every non-null cell is kept in `raw`

use std::collections::BTreeMap;

use crate::types::{Cell, Observation, ObservationValue, RowView, Warning};

use super::dates::coerce_date;

pub const MISSING_SERIES: &str = "Missing series";
pub const MISSING_DATE: &str = "Missing date";
pub const MISSING_VALUE: &str = "Missing value";

/// Result of coercing a single row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowOutcome {
    pub observation: Option<Observation>,
    pub warnings: Vec<Warning>,
}

impl RowOutcome {
    fn dropped(warning: Warning) -> Self {
        Self {
            observation: None,
            warnings: vec![warning],
        }
    }
}

/// Validate and coerce one row. `row_index` is the 1-based sheet row.
pub fn coerce_row(row: RowView<'_>, row_index: usize) -> RowOutcome {
    let series = match non_blank(row, "series").and_then(Cell::to_text) {
        Some(s) => s,
        None => return RowOutcome::dropped(Warning::new(row_index, MISSING_SERIES)),
    };

    let date = match non_blank(row, "date").and_then(coerce_date) {
        Some(d) => d,
        None => return RowOutcome::dropped(Warning::new(row_index, MISSING_DATE)),
    };

    let mut warnings = Vec::new();
    let value = non_blank(row, "value").and_then(coerce_value);
    if value.is_none() {
        warnings.push(Warning::new(row_index, MISSING_VALUE));
    }

    let vintage_date = non_blank(row, "vintage_date").and_then(coerce_date);

    let country = non_blank(row, "country")
        .and_then(Cell::to_text)
        .or_else(|| descriptive(row, "region"));

    let observation = Observation {
        row_index,
        date,
        series,
        value,
        frequency: descriptive(row, "frequency"),
        units: descriptive(row, "units"),
        country,
        source: descriptive(row, "source"),
        vintage_date,
        notes: descriptive(row, "notes"),
        raw: raw_cells(row),
    };

    RowOutcome {
        observation: Some(observation),
        warnings,
    }
}

fn non_blank<'a>(row: RowView<'a>, column: &str) -> Option<&'a Cell> {
    row.get(column).filter(|c| !c.is_blank())
}

fn descriptive(row: RowView<'_>, column: &str) -> Option<String> {
    row.get(column).and_then(Cell::to_text)
}

fn coerce_value(cell: &Cell) -> Option<ObservationValue> {
    match cell.as_number() {
        Some(n) => Some(ObservationValue::Number(n)),
        // NaN floats are null, so they never reach the text branch.
        None => cell.to_text().map(ObservationValue::Text),
    }
}

fn raw_cells(row: RowView<'_>) -> BTreeMap<String, String> {
    let mut raw = BTreeMap::new();
    for (column, cell) in row.iter() {
        if raw.contains_key(column) {
            continue;
        }
        if let Some(text) = cell.to_text() {
            raw.insert(column.to_string(), text);
        }
    }
    raw
}
