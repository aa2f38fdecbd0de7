use serde::{Deserialize, Serialize};
use validator::Validate;

/// How strongly a blocker prevents closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerSeverity {
    /// Closure cannot proceed until this is resolved.
    Blocking,
    /// Surfaced to the owner, does not prevent closure.
    Warning,
}

/// A reason, surfaced by one checker, that a closure must not proceed or
/// should be flagged. Transient: produced by `check`, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blocker {
    /// The checker that produced this blocker.
    pub module_id: String,
    pub severity: BlockerSeverity,
    /// Machine-readable kind, e.g. "outstanding_balance".
    pub kind: String,
    pub title: String,
    pub description: String,
    /// What the owner has to do to clear the blocker, if anything.
    pub action_required: Option<String>,
}

impl Blocker {
    pub fn blocking(
        module_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            severity: BlockerSeverity::Blocking,
            kind: kind.into(),
            title: title.into(),
            description: description.into(),
            action_required: None,
        }
    }

    pub fn warning(
        module_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            severity: BlockerSeverity::Warning,
            kind: kind.into(),
            title: title.into(),
            description: description.into(),
            action_required: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action_required = Some(action.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == BlockerSeverity::Blocking
    }
}

/// A summary of data one checker would archive at closure time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivableItem {
    pub module_id: String,
    pub label: String,
    pub item_count: i64,
    pub detail: serde_json::Value,
}

/// Aggregate result of fanning `check` out to all registered checkers.
/// Pure read-model, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClosurePreview {
    pub blockers: Vec<Blocker>,
    pub archivable_data: Vec<ArchivableItem>,
}

impl ClosurePreview {
    /// Blocking-severity blockers, in checker registration order.
    pub fn blocking(&self) -> impl Iterator<Item = &Blocker> {
        self.blockers.iter().filter(|b| b.is_blocking())
    }

    pub fn has_blocking(&self) -> bool {
        self.blockers.iter().any(Blocker::is_blocking)
    }
}

/// Request body for initiating closure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InitiateClosing {
    /// Free-text reason recorded on the organization.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_detects_blocking_severity() {
        let mut preview = ClosurePreview::default();
        assert!(!preview.has_blocking());

        preview.blockers.push(Blocker::warning(
            "files",
            "stored_files",
            "Stored files",
            "12 files will be archived",
        ));
        assert!(!preview.has_blocking());

        preview.blockers.push(
            Blocker::blocking(
                "wallet",
                "outstanding_balance",
                "Outstanding balance",
                "The wallet holds 150.00 EUR",
            )
            .with_action("Withdraw the remaining funds"),
        );
        assert!(preview.has_blocking());
        assert_eq!(preview.blocking().count(), 1);
    }
}
