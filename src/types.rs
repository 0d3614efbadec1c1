//! Core data model types for ingestion.
//!
//! A spreadsheet is read into a [`Sheet`] of raw [`Cell`]s. Each data row is then coerced into at
//! most one [`Observation`] plus zero or more [`Warning`]s.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A single raw spreadsheet cell, decoupled from the reader library.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Integer cell.
    Int(i64),
    /// Floating point cell (may be NaN).
    Float(f64),
    /// Boolean cell.
    Bool(bool),
    /// Text cell, kept verbatim.
    Text(String),
    /// A cell formatted as a date or datetime in the workbook.
    DateTime(NaiveDateTime),
    /// Formula error such as `#N/A` or `#DIV/0!`.
    Error(String),
}

impl Cell {
    /// True when the cell carries no value: empty, an error, or a NaN float.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// True when the cell is null or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            other => other.is_null(),
        }
    }

    /// Numeric reading of the cell, if it holds a number (booleans count as 1.0 / 0.0).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if !f.is_nan() => Some(*f),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Stringified cell, or `None` for null cells.
    pub fn to_text(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Cell::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Empty | Cell::Error(_) => return None,
        })
    }
}

/// A sheet as read from a workbook: normalized header plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Normalized column names in sheet order (duplicates are preserved).
    pub columns: Vec<String>,
    /// Absolute 1-based sheet row number of the first data row.
    pub first_data_row: usize,
    /// Row-major cells; each row has `columns.len()` cells.
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Borrowed view of one data row, addressable by normalized column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    /// Pair a header with a row of cells.
    pub fn new(columns: &'a [String], cells: &'a [Cell]) -> Self {
        Self { columns, cells }
    }

    /// Cell under the first column called `name`, if the column exists.
    pub fn get(&self, name: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.cells.get(idx).unwrap_or(&Cell::Empty))
    }

    /// Iterate `(column, cell)` pairs in sheet order.
    pub fn iter(self) -> impl Iterator<Item = (&'a str, &'a Cell)> + 'a {
        let cells = self.cells;
        self.columns
            .iter()
            .enumerate()
            .map(move |(idx, c)| (c.as_str(), cells.get(idx).unwrap_or(&Cell::Empty)))
    }
}

/// The measured value of an observation: numeric or textual, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    /// Numeric cell, stored as `value_num`.
    Number(f64),
    /// Non-numeric, non-empty cell, stored as `value_text`.
    Text(String),
}

/// One normalized record derived from a single spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// 1-based sheet row (the header is row 1, the first data row is row 2).
    pub row_index: usize,
    /// `YYYY-MM-DD` when parseable, otherwise the original cell text.
    pub date: String,
    /// Non-empty series label.
    pub series: String,
    /// `None` when the value cell was empty.
    pub value: Option<ObservationValue>,
    pub frequency: Option<String>,
    pub units: Option<String>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub vintage_date: Option<String>,
    pub notes: Option<String>,
    /// Every non-null cell of the source row, stringified, keyed by normalized column name.
    pub raw: BTreeMap<String, String>,
}

impl Observation {
    pub fn value_num(&self) -> Option<f64> {
        match &self.value {
            Some(ObservationValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn value_text(&self) -> Option<&str> {
        match &self.value {
            Some(ObservationValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Observation", 12)?;
        s.serialize_field("row_index", &self.row_index)?;
        s.serialize_field("date", &self.date)?;
        s.serialize_field("series", &self.series)?;
        s.serialize_field("value_num", &self.value_num())?;
        s.serialize_field("value_text", &self.value_text())?;
        s.serialize_field("frequency", &self.frequency)?;
        s.serialize_field("units", &self.units)?;
        s.serialize_field("country", &self.country)?;
        s.serialize_field("source", &self.source)?;
        s.serialize_field("vintage_date", &self.vintage_date)?;
        s.serialize_field("notes", &self.notes)?;
        s.serialize_field("raw", &self.raw)?;
        s.end()
    }
}

/// A non-fatal, per-row ingestion issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// 1-based sheet row.
    pub row: usize,
    /// Human-readable message, e.g. `"Missing date"`.
    pub error: String,
}

impl Warning {
    pub fn new(row: usize, error: impl Into<String>) -> Self {
        Self {
            row,
            error: error.into(),
        }
    }
}
