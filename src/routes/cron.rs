//! Scheduler-triggered reaper commands.
//!
//! Each handler runs a single pass of the corresponding job and returns its
//! summary. The passes are idempotent commands: overlapping invocations from
//! multiple schedulers degrade to no-ops (see the jobs module).

use axum::{Json, extract::State};

use super::error::ApiError;
use crate::{
    AppState,
    jobs::{
        ArchiveCleanupResult, NotifyRunResult, TrashCleanupResult, run_archive_cleanup,
        run_expiry_notification, run_file_trash_cleanup,
    },
};

/// Warn owners whose archive enters the notification window.
pub async fn archive_expiry_notifications(
    State(state): State<AppState>,
) -> Result<Json<NotifyRunResult>, ApiError> {
    let result = run_expiry_notification(
        &state.db,
        state.notifier.as_ref(),
        &state.services.plans,
        state.config.workers.batch_size,
    )
    .await?;
    Ok(Json(result))
}

/// Purge archives whose retention window elapsed.
pub async fn cleanup_archives(
    State(state): State<AppState>,
) -> Result<Json<ArchiveCleanupResult>, ApiError> {
    let result = run_archive_cleanup(
        &state.db,
        state.orchestrator.checkers(),
        &state.event_bus,
        state.config.workers.batch_size,
    )
    .await?;
    Ok(Json(result))
}

/// Purge trashed files past their expiry.
pub async fn cleanup_file_trash(
    State(state): State<AppState>,
) -> Result<Json<TrashCleanupResult>, ApiError> {
    let result = run_file_trash_cleanup(
        &state.db,
        state.storage.as_ref(),
        &state.event_bus,
        state.config.workers.batch_size,
    )
    .await?;
    Ok(Json(result))
}
