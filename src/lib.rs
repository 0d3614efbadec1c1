//! `econ-data-approval` ingests spreadsheet-based economic time series into a canonical
//! observation schema and routes every ingested batch through a human approval workflow.
//!
//! The two halves are tightly coupled: the ingestion pipeline produces the exact row set and
//! warning log that an [`lifecycle::Import`] carries for its whole life.
//!
//! ## Ingestion
//!
//! [`ingestion::ingest_workbook`] reads the first sheet of an `.xlsx` / `.xls` upload:
//!
//! - headers are normalized (`Period` -> `date`, `Indicator` -> `series`, `Val` -> `value`, ...)
//! - `date`, `series` and `value` are required; otherwise the upload fails before any row is read
//! - each row yields an [`types::Observation`] and/or [`types::Warning`]s; defective rows never
//!   fail the upload
//!
//! ```no_run
//! use econ_data_approval::ingestion::{IngestionOptions, ingest_workbook};
//!
//! # fn main() -> Result<(), econ_data_approval::IngestionError> {
//! let bytes = std::fs::read("macro.xlsx")?;
//! let report = ingest_workbook(&bytes, "macro.xlsx", &IngestionOptions::default())?;
//! for w in &report.warnings {
//!     println!("row {}: {}", w.row, w.error);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Lifecycle
//!
//! ```no_run
//! use econ_data_approval::lifecycle::{Caller, ImportService, InMemoryStore, Role, RowQuery};
//!
//! # fn main() -> Result<(), econ_data_approval::ImportError> {
//! let service = ImportService::new(InMemoryStore::new());
//! let alice = Caller::new("alice", Role::Uploader);
//! let bob = Caller::new("bob", Role::Approver);
//!
//! let bytes = std::fs::read("macro.xlsx").unwrap_or_default();
//! let import = service.upload(&alice, "macro.xlsx", &bytes)?;
//! let page = service.rows(&bob, import.id, &RowQuery::page(1).with_series("GDP"))?;
//! println!("{} matching rows", page.total);
//! service.approve(&bob, import.id)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: header normalization, row coercion and the pipeline entrypoints
//! - [`lifecycle`]: import entity, authorization policy, store seam, queries and export
//! - [`types`]: cells, observations and warnings
//! - [`error`]: error types and their client/server fault classification

pub mod error;
pub mod ingestion;
pub mod lifecycle;
pub mod types;

pub use error::{Fault, ImportError, ImportResult, IngestionError, IngestionResult, StoreError};
