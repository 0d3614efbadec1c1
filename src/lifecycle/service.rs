//! Role-gated lifecycle operations over an [`ImportStore`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ImportError, ImportResult};
use crate::ingestion::{IngestionOptions, ingest_workbook};

use super::export::ExportRows;
use super::model::{Caller, Import, ImportStatus, Review};
use super::policy::{Action, Resource, can, list_scope};
use super::query::{PageWindow, RowPage, RowQuery};
use super::store::{ImportCounts, ImportFilter, ImportStore, ReviewOutcome};

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOptions {
    /// Rows per page when a row query does not say.
    pub default_page_size: usize,
    /// Larger requested page sizes are clamped to this.
    pub max_page_size: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

/// Whole-store counts returned by [`ImportService::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub imports: ImportCounts,
    pub observations: ObservationCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationCounts {
    pub total: usize,
}

/// Entry point for every import lifecycle operation.
pub struct ImportService<S> {
    store: S,
    options: ServiceOptions,
    ingestion: IngestionOptions,
}

impl<S: ImportStore> ImportService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            options: ServiceOptions::default(),
            ingestion: IngestionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    /// Options passed to the ingestion pipeline on every upload.
    pub fn with_ingestion_options(mut self, ingestion: IngestionOptions) -> Self {
        self.ingestion = ingestion;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest an uploaded spreadsheet and persist it as a PENDING import.
    ///
    /// Nothing is persisted unless the whole file ingests.
    pub fn upload(&self, caller: &Caller, filename: &str, bytes: &[u8]) -> ImportResult<Import> {
        self.authorize(caller, Action::Upload, Resource::Store)?;

        let report = ingest_workbook(bytes, filename, &self.ingestion)?;
        let import = Import::pending(filename, &caller.username, &report);
        self.store.insert(import.clone(), report.observations)?;

        info!(
            id = %import.id,
            filename,
            uploaded_by = %caller.username,
            rows = import.row_count,
            warnings = import.parse_warnings.len(),
            "import created"
        );
        Ok(import)
    }

    /// Imports visible to `caller`, most recent upload first.
    pub fn list(&self, caller: &Caller, status: Option<ImportStatus>) -> ImportResult<Vec<Import>> {
        self.authorize(caller, Action::View, Resource::Store)?;
        let filter = ImportFilter {
            uploaded_by: list_scope(caller).map(str::to_string),
            status,
        };
        Ok(self.store.list(&filter)?)
    }

    pub fn get(&self, caller: &Caller, id: Uuid) -> ImportResult<Import> {
        self.visible(caller, id)
    }

    /// One page of an import's observations, with the total matching the same filter.
    pub fn rows(&self, caller: &Caller, id: Uuid, query: &RowQuery) -> ImportResult<RowPage> {
        let window = PageWindow::resolve(
            query.page,
            query.page_size,
            self.options.default_page_size,
            self.options.max_page_size,
        )?;
        self.visible(caller, id)?;

        let (data, total) =
            self.store
                .query_observations(id, &query.filter, window.offset, window.page_size)?;
        debug!(%id, page = window.page, returned = data.len(), total, "row query");
        Ok(RowPage {
            data,
            total,
            page: window.page,
            page_size: window.page_size,
        })
    }

    pub fn approve(&self, caller: &Caller, id: Uuid) -> ImportResult<Import> {
        self.review(caller, id, Action::Approve, ImportStatus::Approved)
    }

    pub fn reject(&self, caller: &Caller, id: Uuid) -> ImportResult<Import> {
        self.review(caller, id, Action::Reject, ImportStatus::Rejected)
    }

    /// Stream every observation of an import as CSV lines, header first.
    ///
    /// The rows are a snapshot taken when this is called.
    pub fn export(&self, caller: &Caller, id: Uuid) -> ImportResult<ExportRows> {
        self.visible(caller, id)?;
        Ok(ExportRows::new(self.store.observations(id)?))
    }

    pub fn summary(&self, caller: &Caller) -> ImportResult<Summary> {
        self.authorize(caller, Action::ViewSummary, Resource::Store)?;
        let counts = self.store.counts()?;
        Ok(Summary {
            imports: counts.imports,
            observations: ObservationCounts {
                total: counts.observations,
            },
        })
    }

    /// Remove an import and every observation it owns.
    pub fn delete(&self, caller: &Caller, id: Uuid) -> ImportResult<()> {
        self.authorize(caller, Action::Delete, Resource::Store)?;
        if !self.store.delete(id)? {
            return Err(ImportError::NotFound { id });
        }
        info!(%id, deleted_by = %caller.username, "import deleted");
        Ok(())
    }

    fn review(&self, caller: &Caller, id: Uuid, action: Action, to: ImportStatus) -> ImportResult<Import> {
        self.authorize(caller, action, Resource::Store)?;

        let review = Review {
            status: to,
            by: caller.username.clone(),
            at: Utc::now(),
        };
        match self.store.update_review(id, &review)? {
            ReviewOutcome::Applied(updated) => {
                info!(%id, status = %to, by = %caller.username, "import reviewed");
                Ok(updated)
            }
            ReviewOutcome::Conflict { current } => {
                debug!(%id, from = %current, %to, "transition refused");
                Err(ImportError::InvalidTransition { from: current, to })
            }
            ReviewOutcome::Missing => Err(ImportError::NotFound { id }),
        }
    }

    // Imports the caller may not view are reported as missing.
    fn visible(&self, caller: &Caller, id: Uuid) -> ImportResult<Import> {
        let import = self.store.get(id)?.ok_or(ImportError::NotFound { id })?;
        if !can(caller, Action::View, Resource::Import(&import)) {
            debug!(%id, caller = %caller.username, "import hidden from caller");
            return Err(ImportError::NotFound { id });
        }
        Ok(import)
    }

    fn authorize(&self, caller: &Caller, action: Action, resource: Resource<'_>) -> ImportResult<()> {
        if can(caller, action, resource) {
            Ok(())
        } else {
            warn!(caller = %caller.username, role = ?caller.role, %action, "action denied");
            Err(ImportError::Forbidden { action })
        }
    }
}
