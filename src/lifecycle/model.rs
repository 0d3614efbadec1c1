//! Import batch entity and the identities that act on it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingestion::IngestionReport;
use crate::types::Warning;

/// Approval status of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        })
    }
}

impl ImportStatus {
    /// Whether a review may move an import from `self` to `to`.
    ///
    /// Re-approving an approved import is allowed and re-stamps the approver.
    pub fn can_move_to(self, to: ImportStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Approved) | (Self::Approved, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

/// Caller permission tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Submits spreadsheets; sees only their own imports.
    Uploader,
    /// Reviews imports; sees everything.
    Approver,
    /// Everything an uploader and an approver may do, plus deletion.
    Admin,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

/// One uploaded spreadsheet tracked as a single approvable unit.
///
/// Owned observations live in the store next to the import and are removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub id: Uuid,
    pub original_filename: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: ImportStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    /// Data rows read from the sheet, including rows that only produced warnings.
    pub row_count: usize,
    /// Normalized header as read from the sheet.
    pub columns: Vec<String>,
    pub parse_warnings: Vec<Warning>,
}

impl Import {
    /// A fresh PENDING import describing `report`.
    pub fn pending(
        original_filename: impl Into<String>,
        uploaded_by: impl Into<String>,
        report: &IngestionReport,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_filename: original_filename.into(),
            uploaded_by: uploaded_by.into(),
            uploaded_at: Utc::now(),
            status: ImportStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            row_count: report.row_count,
            columns: report.columns.clone(),
            parse_warnings: report.warnings.clone(),
        }
    }

    /// Write the status/reviewer/timestamp triple of `review`.
    ///
    /// The timestamp never precedes `uploaded_at`.
    pub fn apply_review(&mut self, review: &Review) {
        let at = review.at.max(self.uploaded_at);
        self.status = review.status;
        match review.status {
            ImportStatus::Approved => {
                self.approved_by = Some(review.by.clone());
                self.approved_at = Some(at);
            }
            ImportStatus::Rejected => {
                self.rejected_by = Some(review.by.clone());
                self.rejected_at = Some(at);
            }
            ImportStatus::Pending => {}
        }
    }

    /// Download name for the CSV export: `<original stem>_<id>.csv`.
    pub fn export_filename(&self) -> String {
        let stem = self
            .original_filename
            .rsplit_once('.')
            .map_or(self.original_filename.as_str(), |(stem, _)| stem);
        format!("{stem}_{}.csv", self.id)
    }
}

/// A status transition as persisted: new status, reviewer, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub status: ImportStatus,
    pub by: String,
    pub at: DateTime<Utc>,
}
