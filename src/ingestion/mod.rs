//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_workbook`] (from [`pipeline`]) which:
//!
//! - picks a reader by file extension (`.xlsx` / `.xls`) and reads the first sheet
//! - normalizes headers ([`header`]) and requires `date`, `series`, `value`
//! - coerces every row ([`row`]) into an observation and/or warnings
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]

pub mod dates;
pub mod excel;
pub mod header;
pub mod observability;
pub mod pipeline;
pub mod row;

pub use header::{REQUIRED_COLUMNS, normalize_header};
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};
pub use pipeline::{
    IngestionOptions, IngestionReport, SpreadsheetFormat, ingest_from_path, ingest_sheet, ingest_workbook,
};
pub use row::{RowOutcome, coerce_row};
