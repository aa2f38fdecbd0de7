use thiserror::Error;

use crate::{
    db::DbError,
    models::{Blocker, OrganizationStatus},
};

/// Summarize blocking blockers as `module_id: title` pairs for the
/// CANNOT_CLOSE detail message.
fn blocker_summary(blockers: &[Blocker]) -> String {
    blockers
        .iter()
        .map(|b| format!("{}: {}", b.module_id, b.title))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ClosureError {
    #[error("Organization not found")]
    NotFound,

    #[error("Only the organization owner may close the organization")]
    Forbidden,

    #[error("Organization is already {0}")]
    AlreadyClosed(OrganizationStatus),

    #[error("Cannot close organization, unresolved blockers: {}", blocker_summary(.blockers))]
    CannotClose { blockers: Vec<Blocker> },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_close_lists_module_and_title() {
        let err = ClosureError::CannotClose {
            blockers: vec![
                Blocker::blocking("wallet", "outstanding_balance", "Outstanding wallet balance", ""),
                Blocker::blocking("projects", "active_projects", "Active projects", ""),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("wallet: Outstanding wallet balance"));
        assert!(message.contains("projects: Active projects"));
    }
}
