use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::model::ImportStatus;
use crate::lifecycle::policy::Action;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for import lifecycle operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error type returned by the ingestion pipeline.
///
/// Row-level problems (missing series/date/value) are never errors; they are collected as
/// [`crate::types::Warning`]s. These variants only cover a file or header shape that is unusable.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (only produced by the path-based convenience entrypoint).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The filename does not carry a supported spreadsheet extension.
    #[error("Invalid file format. Must be .xlsx or .xls (got '{filename}')")]
    UnsupportedFormat { filename: String },

    /// The workbook could not be opened or decoded (corrupt file, wrong format).
    #[error("Failed to parse Excel: {message}")]
    Unparseable { message: String },

    /// The workbook has no sheet, or its first sheet has no header row.
    #[error("Failed to parse Excel: {message}")]
    EmptyWorkbook { message: String },

    /// One or more of the required canonical columns is absent after header normalization.
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },
}

impl IngestionError {
    /// True for errors that mean "the bytes are not a readable spreadsheet".
    pub fn is_unparseable(&self) -> bool {
        matches!(self, Self::Unparseable { .. } | Self::EmptyWorkbook { .. })
    }
}

impl From<calamine::XlsxError> for IngestionError {
    fn from(e: calamine::XlsxError) -> Self {
        Self::Unparseable {
            message: e.to_string(),
        }
    }
}

impl From<calamine::XlsError> for IngestionError {
    fn from(e: calamine::XlsError) -> Self {
        Self::Unparseable {
            message: e.to_string(),
        }
    }
}

/// Failure reported by an [`crate::lifecycle::store::ImportStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// An import with this id already exists.
    #[error("import {0} already exists")]
    Duplicate(Uuid),

    /// Backend-specific failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Error type returned by the import lifecycle service.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// The caller's role does not allow the requested action.
    #[error("Not authorized to {action}")]
    Forbidden { action: Action },

    /// No import with this id exists, or the caller may not know it exists.
    #[error("Import not found: {id}")]
    NotFound { id: Uuid },

    /// The status transition is not allowed from the current state.
    #[error("cannot move import from {from} to {to}")]
    InvalidTransition { from: ImportStatus, to: ImportStatus },

    /// Pagination or filter arguments are out of range.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Transport-agnostic classification of an [`ImportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Caller sent unusable input (bad file, missing columns, bad pagination).
    BadRequest,
    /// Caller's role lacks permission.
    Forbidden,
    /// Requested import does not exist (or is hidden from the caller).
    NotFound,
    /// Requested transition conflicts with the current status.
    Conflict,
    /// Server-side failure; not the caller's fault.
    Internal,
}

impl ImportError {
    /// Classify this error for a transport layer.
    pub fn fault(&self) -> Fault {
        match self {
            Self::Ingestion(IngestionError::Io(_)) => Fault::Internal,
            Self::Ingestion(_) | Self::InvalidQuery { .. } => Fault::BadRequest,
            Self::Forbidden { .. } => Fault::Forbidden,
            Self::NotFound { .. } => Fault::NotFound,
            Self::InvalidTransition { .. } => Fault::Conflict,
            Self::Store(_) | Self::Csv(_) => Fault::Internal,
        }
    }
}
