//! File trash endpoints: trash, restore, list.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::{
    AppState,
    middleware::CallerIdentity,
    models::{FileTrashEntry, StoredFile},
};

#[derive(Debug, Serialize)]
pub struct TrashListResponse {
    pub data: Vec<FileTrashEntry>,
}

/// Soft-delete a file into the trash with a plan-derived retention window.
pub async fn trash_file(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path((org_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<FileTrashEntry>), ApiError> {
    let entry = state
        .services
        .file_trash
        .trash(org_id, file_id, identity.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Restore a trashed file. Idempotent: an entry that was already restored
/// or purged reports `not_found` rather than failing loudly.
pub async fn restore_file(
    State(state): State<AppState>,
    Extension(_identity): Extension<CallerIdentity>,
    Path((org_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StoredFile>, ApiError> {
    let file = state.services.file_trash.restore(org_id, file_id).await?;
    Ok(Json(file))
}

/// Active (unrestored) trash entries for the organization.
pub async fn list_trash(
    State(state): State<AppState>,
    Extension(_identity): Extension<CallerIdentity>,
    Path(org_id): Path<Uuid>,
) -> Result<Json<TrashListResponse>, ApiError> {
    let data = state.services.file_trash.list(org_id).await?;
    Ok(Json(TrashListResponse { data }))
}
