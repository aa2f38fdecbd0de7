//! Scheduled reaper jobs for the retention engine.
//!
//! Three jobs, all idempotent commands:
//!
//! - **Expiry notifier**: warns organization owners whose archive is inside
//!   the notification window, at most once per archive per UTC calendar day.
//! - **Archive cleaner**: purges archives whose retention window elapsed by
//!   fanning `delete_archived` out to every registered checker.
//! - **File-trash cleaner**: purges trashed files past their expiry, blob
//!   before row.
//!
//! Each job follows the same pattern: a `run_*` function performing a single
//! pass (also reachable through the /cron endpoints for external
//! schedulers), a `start_*_worker` loop for single-node installs, and a
//! structured result type summarizing the pass. Every mutating step is a
//! conditional state transition on the owning row, so overlapping
//! invocations from multiple schedulers degrade to no-ops.

mod archive_cleanup;
mod archive_expiry;
mod file_trash_cleanup;

pub use archive_cleanup::{ArchiveCleanupResult, run_archive_cleanup, start_archive_cleanup_worker};
pub use archive_expiry::{NotifyRunResult, run_expiry_notification, start_expiry_notifier_worker};
pub use file_trash_cleanup::{
    TrashCleanupResult, run_file_trash_cleanup, start_file_trash_cleanup_worker,
};
