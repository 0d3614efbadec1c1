//! Authorization rules, consulted uniformly by every lifecycle operation.

use std::fmt;

use serde::Serialize;

use super::model::{Caller, Import, Role};

/// Something a caller may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Upload,
    Approve,
    Reject,
    /// Get, list, row query and export.
    View,
    Delete,
    ViewSummary,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::View => "view",
            Self::Delete => "delete",
            Self::ViewSummary => "view summary",
        })
    }
}

/// What an action targets.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// The store as a whole (uploads, listings, summary).
    Store,
    /// One specific import.
    Import(&'a Import),
}

/// Whether `caller` may perform `action` on `resource`.
pub fn can(caller: &Caller, action: Action, resource: Resource<'_>) -> bool {
    match (action, caller.role) {
        (Action::Upload, Role::Uploader | Role::Admin) => true,
        (Action::Approve | Action::Reject, Role::Approver | Role::Admin) => true,
        (Action::Delete, Role::Admin) => true,
        (Action::ViewSummary, _) => true,
        (Action::View, Role::Uploader) => match resource {
            Resource::Store => true,
            Resource::Import(imp) => imp.uploaded_by == caller.username,
        },
        (Action::View, Role::Approver | Role::Admin) => true,
        _ => false,
    }
}

/// Uploader to restrict listings to, or `None` when the caller sees every import.
pub fn list_scope(caller: &Caller) -> Option<&str> {
    match caller.role {
        Role::Uploader => Some(caller.username.as_str()),
        Role::Approver | Role::Admin => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::IngestionReport;

    fn import_by(user: &str) -> Import {
        let report = IngestionReport {
            observations: Vec::new(),
            columns: Vec::new(),
            warnings: Vec::new(),
            row_count: 0,
        };
        Import::pending("x.xlsx", user, &report)
    }

    #[test]
    fn only_approver_class_roles_review() {
        let alice = Caller::new("alice", Role::Uploader);
        let bob = Caller::new("bob", Role::Approver);
        let admin = Caller::new("admin", Role::Admin);
        for action in [Action::Approve, Action::Reject] {
            assert!(!can(&alice, action, Resource::Store));
            assert!(can(&bob, action, Resource::Store));
            assert!(can(&admin, action, Resource::Store));
        }
    }

    #[test]
    fn approvers_cannot_upload_and_only_admins_delete() {
        let bob = Caller::new("bob", Role::Approver);
        let alice = Caller::new("alice", Role::Uploader);
        let admin = Caller::new("admin", Role::Admin);
        assert!(!can(&bob, Action::Upload, Resource::Store));
        assert!(can(&alice, Action::Upload, Resource::Store));
        assert!(!can(&bob, Action::Delete, Resource::Store));
        assert!(can(&admin, Action::Delete, Resource::Store));
    }

    #[test]
    fn uploaders_only_see_their_own_imports() {
        let alice = Caller::new("alice", Role::Uploader);
        let carol = Caller::new("carol", Role::Uploader);
        let bob = Caller::new("bob", Role::Approver);
        let imp = import_by("alice");

        assert!(can(&alice, Action::View, Resource::Import(&imp)));
        assert!(!can(&carol, Action::View, Resource::Import(&imp)));
        assert!(can(&bob, Action::View, Resource::Import(&imp)));
        assert_eq!(list_scope(&alice), Some("alice"));
        assert_eq!(list_scope(&bob), None);
    }

    #[test]
    fn everyone_sees_the_summary() {
        for role in [Role::Uploader, Role::Approver, Role::Admin] {
            assert!(can(&Caller::new("x", role), Action::ViewSummary, Resource::Store));
        }
    }
}
