//! Ingestion pipeline entrypoint.
//!
//! Most callers should use [`ingest_workbook`], which turns uploaded spreadsheet bytes into an
//! [`IngestionReport`]:
//!
//! - the reader is chosen from the filename extension (`.xlsx` or `.xls`)
//! - only the first sheet is read; headers are normalized to the canonical vocabulary
//! - `date`, `series` and `value` must all be present, otherwise nothing is processed
//! - each row is coerced independently into an observation and/or warnings
//!
//! If an [`super::observability::IngestionObserver`] is configured, success/failure/alerts are
//! reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Observation, RowView, Sheet, Warning};

use super::excel::read_first_sheet;
use super::header::missing_required;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::row::{RowOutcome, coerce_row};

// Below this many rows per task rayon splitting costs more than it saves.
const PARALLEL_MIN_ROWS: usize = 256;

/// Supported spreadsheet formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook (`.xlsx`).
    Xlsx,
    /// Legacy BIFF workbook (`.xls`).
    Xls,
}

impl SpreadsheetFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    /// Infer the format from an uploaded filename.
    pub fn from_filename(filename: &str) -> IngestionResult<Self> {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| IngestionError::UnsupportedFormat {
                filename: filename.to_string(),
            })
    }
}

/// Options controlling ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Everything the pipeline produces for one spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionReport {
    /// Observations in sheet order.
    pub observations: Vec<Observation>,
    /// Normalized header, in sheet order.
    pub columns: Vec<String>,
    /// Per-row issues, in sheet order.
    pub warnings: Vec<Warning>,
    /// Data rows read, including rows that only produced warnings.
    pub row_count: usize,
}

/// Ingest an uploaded spreadsheet.
///
/// # Errors
///
/// - [`IngestionError::UnsupportedFormat`] if `filename` is not `.xlsx` / `.xls`
/// - [`IngestionError::Unparseable`] / [`IngestionError::EmptyWorkbook`] if the bytes cannot be read
/// - [`IngestionError::MissingColumns`] if any of `date`, `series`, `value` is absent
///
/// # Examples
///
/// ```no_run
/// use econ_data_approval::ingestion::{IngestionOptions, ingest_workbook};
///
/// # fn main() -> Result<(), econ_data_approval::IngestionError> {
/// let bytes = std::fs::read("gdp.xlsx")?;
/// let report = ingest_workbook(&bytes, "gdp.xlsx", &IngestionOptions::default())?;
/// println!("rows={} warnings={}", report.row_count, report.warnings.len());
/// # Ok(())
/// # }
/// ```
pub fn ingest_workbook(
    bytes: &[u8],
    filename: &str,
    options: &IngestionOptions,
) -> IngestionResult<IngestionReport> {
    let format = SpreadsheetFormat::from_filename(filename);
    let ctx = IngestionContext {
        filename: filename.to_string(),
        format: format.as_ref().ok().copied(),
    };

    let result = format
        .and_then(|fmt| read_first_sheet(bytes, fmt))
        .and_then(ingest_sheet);

    notify(options, &ctx, result.as_ref());
    result
}

/// Read a spreadsheet from disk and run [`ingest_workbook`] on it.
///
/// A file that cannot be read is reported to the observer as a `Critical` failure.
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<IngestionReport> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    match std::fs::read(path) {
        Ok(bytes) => ingest_workbook(&bytes, &filename, options),
        Err(e) => {
            let err = IngestionError::from(e);
            let ctx = IngestionContext {
                format: SpreadsheetFormat::from_filename(&filename).ok(),
                filename,
            };
            notify(options, &ctx, Err(&err));
            Err(err)
        }
    }
}

fn notify(
    options: &IngestionOptions,
    ctx: &IngestionContext,
    result: Result<&IngestionReport, &IngestionError>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(report) => obs.on_success(
            ctx,
            IngestionStats {
                rows: report.row_count,
                observations: report.observations.len(),
                warnings: report.warnings.len(),
            },
        ),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// Validate the header of an already-read sheet and coerce every row.
///
/// Rows are coerced in parallel; the outcomes are concatenated in sheet order.
pub fn ingest_sheet(sheet: Sheet) -> IngestionResult<IngestionReport> {
    let missing = missing_required(&sheet.columns);
    if !missing.is_empty() {
        return Err(IngestionError::MissingColumns { columns: missing });
    }

    let outcomes: Vec<RowOutcome> = sheet
        .rows
        .par_iter()
        .with_min_len(PARALLEL_MIN_ROWS)
        .enumerate()
        .map(|(idx, cells)| {
            coerce_row(RowView::new(&sheet.columns, cells), sheet.first_data_row + idx)
        })
        .collect();

    let (observations, warnings) = outcomes.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut observations, mut warnings), outcome| {
            observations.extend(outcome.observation);
            warnings.extend(outcome.warnings);
            (observations, warnings)
        },
    );

    Ok(IngestionReport {
        observations,
        warnings,
        row_count: sheet.row_count(),
        columns: sheet.columns,
    })
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::UnsupportedFormat { .. }
        | IngestionError::Unparseable { .. }
        | IngestionError::EmptyWorkbook { .. }
        | IngestionError::MissingColumns { .. } => IngestionSeverity::Error,
    }
}
