//! Organization closure endpoints: preview and initiate.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use uuid::Uuid;

use super::error::ApiError;
use crate::{
    AppState,
    closure::ClosureOutcome,
    middleware::CallerIdentity,
    models::{ClosurePreview, InitiateClosing},
};

/// Preview what closing the organization would entail: outstanding blockers
/// and the data each subsystem would archive. Read-only.
pub async fn preview(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(org_id): Path<Uuid>,
) -> Result<Json<ClosurePreview>, ApiError> {
    let preview = state
        .orchestrator
        .get_closure_preview(org_id, identity.user_id)
        .await?;
    Ok(Json(preview))
}

/// Close the organization. Blockers are re-checked server-side; a preview
/// previously shown to the client is never trusted.
pub async fn initiate(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(org_id): Path<Uuid>,
    Valid(Json(input)): Valid<Json<InitiateClosing>>,
) -> Result<(StatusCode, Json<ClosureOutcome>), ApiError> {
    let outcome = state
        .orchestrator
        .initiate_closing(org_id, identity.user_id, input.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
