//! Persistence seam for imports and their observations.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::Observation;

use super::model::{Import, ImportStatus, Review};
use super::query::RowFilter;

/// Filter for [`ImportStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportFilter {
    pub uploaded_by: Option<String>,
    pub status: Option<ImportStatus>,
}

/// Import counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Result of [`ImportStore::update_review`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// The review was written.
    Applied(Import),
    /// The status at write time does not allow the transition; nothing was written.
    Conflict { current: ImportStatus },
    /// No import with this id.
    Missing,
}

/// Whole-store counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub imports: ImportCounts,
    pub observations: usize,
}

/// Storage for imports and the observations they own.
///
/// Implementations must make [`Self::insert`] and [`Self::update_review`] atomic, and must
/// delete an import's observations together with the import. The transition check in
/// `update_review` must see the same status the write replaces.
pub trait ImportStore: Send + Sync {
    /// Persist an import together with all of its observations.
    fn insert(&self, import: Import, observations: Vec<Observation>) -> Result<(), StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Import>, StoreError>;

    /// Imports matching `filter`, most recent upload first.
    fn list(&self, filter: &ImportFilter) -> Result<Vec<Import>, StoreError>;

    /// Check the transition against the current status and, if allowed, write the
    /// status/reviewer/timestamp triple in the same step.
    fn update_review(&self, id: Uuid, review: &Review) -> Result<ReviewOutcome, StoreError>;

    /// One window of an import's observations in persisted order, plus the count of all
    /// observations matching `filter`.
    fn query_observations(
        &self,
        id: Uuid,
        filter: &RowFilter,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Observation>, usize), StoreError>;

    /// Snapshot of every observation owned by an import, in persisted order.
    fn observations(&self, id: Uuid) -> Result<Vec<Observation>, StoreError>;

    fn counts(&self) -> Result<StoreCounts, StoreError>;

    /// Delete an import and its observations. Returns whether it existed.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Debug)]
struct StoredImport {
    seq: u64,
    import: Import,
    observations: Vec<Observation>,
}

#[derive(Debug, Default)]
struct State {
    next_seq: u64,
    imports: HashMap<Uuid, StoredImport>,
}

/// In-memory storage implementation for development/testing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl ImportStore for InMemoryStore {
    fn insert(&self, import: Import, observations: Vec<Observation>) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.imports.contains_key(&import.id) {
            return Err(StoreError::Duplicate(import.id));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        debug!(id = %import.id, observations = observations.len(), "stored import");
        state.imports.insert(
            import.id,
            StoredImport {
                seq,
                import,
                observations,
            },
        );
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Import>, StoreError> {
        Ok(self.lock()?.imports.get(&id).map(|s| s.import.clone()))
    }

    fn list(&self, filter: &ImportFilter) -> Result<Vec<Import>, StoreError> {
        let state = self.lock()?;
        let mut matching: Vec<&StoredImport> = state
            .imports
            .values()
            .filter(|s| {
                filter
                    .uploaded_by
                    .as_deref()
                    .is_none_or(|u| s.import.uploaded_by == u)
                    && filter.status.is_none_or(|st| s.import.status == st)
            })
            .collect();
        matching.sort_by(|a, b| {
            b.import
                .uploaded_at
                .cmp(&a.import.uploaded_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(matching.into_iter().map(|s| s.import.clone()).collect())
    }

    fn update_review(&self, id: Uuid, review: &Review) -> Result<ReviewOutcome, StoreError> {
        let mut state = self.lock()?;
        let Some(stored) = state.imports.get_mut(&id) else {
            return Ok(ReviewOutcome::Missing);
        };
        let current = stored.import.status;
        if !current.can_move_to(review.status) {
            return Ok(ReviewOutcome::Conflict { current });
        }
        stored.import.apply_review(review);
        Ok(ReviewOutcome::Applied(stored.import.clone()))
    }

    fn query_observations(
        &self,
        id: Uuid,
        filter: &RowFilter,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Observation>, usize), StoreError> {
        let state = self.lock()?;
        let Some(stored) = state.imports.get(&id) else {
            return Ok((Vec::new(), 0));
        };
        let mut total = 0usize;
        let mut page = Vec::new();
        for obs in stored.observations.iter().filter(|o| filter.matches(o)) {
            if total >= offset && page.len() < limit {
                page.push(obs.clone());
            }
            total += 1;
        }
        Ok((page, total))
    }

    fn observations(&self, id: Uuid) -> Result<Vec<Observation>, StoreError> {
        Ok(self
            .lock()?
            .imports
            .get(&id)
            .map(|s| s.observations.clone())
            .unwrap_or_default())
    }

    fn counts(&self) -> Result<StoreCounts, StoreError> {
        let state = self.lock()?;
        let mut counts = StoreCounts::default();
        for stored in state.imports.values() {
            counts.imports.total += 1;
            match stored.import.status {
                ImportStatus::Pending => counts.imports.pending += 1,
                ImportStatus::Approved => counts.imports.approved += 1,
                ImportStatus::Rejected => counts.imports.rejected += 1,
            }
            counts.observations += stored.observations.len();
        }
        Ok(counts)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock()?.imports.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::ingestion::IngestionReport;

    fn import(user: &str) -> Import {
        let report = IngestionReport {
            observations: Vec::new(),
            columns: Vec::new(),
            warnings: Vec::new(),
            row_count: 0,
        };
        Import::pending("x.xlsx", user, &report)
    }

    fn obs(row: usize, series: &str) -> Observation {
        Observation {
            row_index: row,
            date: "2023-01-01".to_string(),
            series: series.to_string(),
            value: None,
            frequency: None,
            units: None,
            country: None,
            source: None,
            vintage_date: None,
            notes: None,
            raw: BTreeMap::new(),
        }
    }

    #[test]
    fn list_orders_most_recent_first_and_filters() {
        let store = InMemoryStore::new();
        let mut older = import("alice");
        older.uploaded_at = Utc::now() - Duration::hours(1);
        let newer = import("bob");
        store.insert(older.clone(), Vec::new()).unwrap();
        store.insert(newer.clone(), Vec::new()).unwrap();

        let all = store.list(&ImportFilter::default()).unwrap();
        assert_eq!(all.iter().map(|i| i.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

        let alice = store
            .list(&ImportFilter {
                uploaded_by: Some("alice".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id, older.id);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        let imp = import("alice");
        store.insert(imp.clone(), Vec::new()).unwrap();
        assert!(matches!(store.insert(imp, Vec::new()), Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn query_total_counts_all_matches_not_just_the_page() {
        let store = InMemoryStore::new();
        let imp = import("alice");
        let rows = (0..7)
            .map(|i| obs(i + 2, if i % 2 == 0 { "GDP" } else { "CPI" }))
            .collect();
        store.insert(imp.clone(), rows).unwrap();

        let filter = RowFilter {
            series: Some("GDP".to_string()),
            ..Default::default()
        };
        let (page, total) = store.query_observations(imp.id, &filter, 2, 1).unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].row_index, 6);
    }

    fn review(status: ImportStatus, by: &str) -> Review {
        Review {
            status,
            by: by.to_string(),
            at: Utc::now(),
        }
    }

    #[test]
    fn update_review_checks_the_status_it_replaces() {
        let store = InMemoryStore::new();
        let imp = import("alice");
        store.insert(imp.clone(), Vec::new()).unwrap();

        let approved = store.update_review(imp.id, &review(ImportStatus::Approved, "bob")).unwrap();
        assert!(matches!(approved, ReviewOutcome::Applied(ref i) if i.status == ImportStatus::Approved));

        let late = store.update_review(imp.id, &review(ImportStatus::Rejected, "eve")).unwrap();
        assert_eq!(
            late,
            ReviewOutcome::Conflict {
                current: ImportStatus::Approved
            }
        );
        let stored = store.get(imp.id).unwrap().unwrap();
        assert_eq!(stored.rejected_by, None);
        assert_eq!(stored.approved_by.as_deref(), Some("bob"));

        let gone = store.update_review(Uuid::new_v4(), &review(ImportStatus::Approved, "bob"));
        assert_eq!(gone.unwrap(), ReviewOutcome::Missing);
    }

    #[test]
    fn delete_cascades_to_observations() {
        let store = InMemoryStore::new();
        let imp = import("alice");
        store.insert(imp.clone(), vec![obs(2, "GDP"), obs(3, "CPI")]).unwrap();
        assert_eq!(store.counts().unwrap().observations, 2);

        assert!(store.delete(imp.id).unwrap());
        assert!(store.get(imp.id).unwrap().is_none());
        assert!(store.observations(imp.id).unwrap().is_empty());
        assert_eq!(store.counts().unwrap(), StoreCounts::default());
        assert!(!store.delete(imp.id).unwrap());
    }
}
