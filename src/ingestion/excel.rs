//! Workbook reading: raw bytes -> first sheet as a normalized [`Sheet`].

use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Cell, Sheet};

use super::header::normalize_header;
use super::pipeline::SpreadsheetFormat;

/// Read the first sheet of an in-memory workbook.
///
/// Behavior:
/// - Picks the reader from `format` (`.xlsx` -> OOXML, `.xls` -> BIFF)
/// - Uses only the first sheet in the workbook
/// - Detects the first non-empty row as the header row and normalizes every header
/// - Returns all remaining rows as raw [`Cell`]s, padded to the header width
pub fn read_first_sheet(bytes: &[u8], format: SpreadsheetFormat) -> IngestionResult<Sheet> {
    let cursor = Cursor::new(bytes);
    let first = match format {
        SpreadsheetFormat::Xlsx => {
            let mut workbook: Xlsx<_> = Xlsx::new(cursor)?;
            workbook
                .worksheet_range_at(0)
                .map(|r| r.map_err(IngestionError::from))
        }
        SpreadsheetFormat::Xls => {
            let mut workbook: Xls<_> = Xls::new(cursor)?;
            workbook
                .worksheet_range_at(0)
                .map(|r| r.map_err(IngestionError::from))
        }
    };

    let range = first.ok_or_else(|| IngestionError::EmptyWorkbook {
        message: "workbook has no sheets".to_string(),
    })??;
    sheet_from_range(&range)
}

/// Split a sheet range into a normalized header and data rows.
pub fn sheet_from_range(range: &Range<Data>) -> IngestionResult<Sheet> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let header_idx = range
        .rows()
        .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .ok_or_else(|| IngestionError::EmptyWorkbook {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })?;

    let header_row = range.rows().nth(header_idx).unwrap_or_default();
    let columns: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let text = cell_to_header_string(c);
            if text.trim().is_empty() {
                format!("unnamed_{}", start_col as usize + idx)
            } else {
                normalize_header(&text)
            }
        })
        .collect();

    let width = columns.len();
    let rows = range
        .rows()
        .skip(header_idx + 1)
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(convert_cell).collect();
            cells.resize(width, Cell::Empty);
            cells
        })
        .collect();

    Ok(Sheet {
        columns,
        // Report 1-based row numbers (Excel-like); the header sits on `header_idx`.
        first_data_row: start_row as usize + header_idx + 2,
        rows,
    })
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => match c.as_datetime() {
            Some(ndt) if !dt.is_duration() => Cell::DateTime(ndt),
            _ => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}
