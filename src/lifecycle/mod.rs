//! Import lifecycle: a PENDING batch moves to APPROVED or REJECTED under role-gated rules.
//!
//! [`ImportService`] is the entry point. Every operation consults [`policy::can`] before it
//! touches the [`store::ImportStore`]:
//!
//! - `upload`: uploader/admin; ingests and persists atomically, always PENDING
//! - `approve` / `reject`: approver/admin
//! - `get` / `rows` / `export`: uploaders see only their own imports; others see everything
//! - `list`: same visibility, most recent upload first
//! - `summary`: any caller
//! - `delete`: admin; cascades to the import's observations

pub mod export;
pub mod model;
pub mod policy;
pub mod query;
pub mod service;
pub mod store;

pub use export::{EXPORT_HEADER, ExportRows};
pub use model::{Caller, Import, ImportStatus, Review, Role};
pub use policy::{Action, Resource, can};
pub use query::{RowFilter, RowPage, RowQuery};
pub use service::{ImportService, ServiceOptions, Summary};
pub use store::{ImportFilter, ImportStore, InMemoryStore, ReviewOutcome};
