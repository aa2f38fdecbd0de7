pub mod closure;
pub mod cron;
mod error;
pub mod health;
pub mod trash;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
pub use error::{ApiError, ErrorBody};

use crate::AppState;

/// Identity-guarded API surface, nested under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/closure/preview",
            get(closure::preview),
        )
        .route(
            "/organizations/{org_id}/closure/initiate",
            post(closure::initiate),
        )
        .route(
            "/organizations/{org_id}/files/{file_id}/trash",
            post(trash::trash_file),
        )
        .route(
            "/organizations/{org_id}/files/{file_id}/restore",
            post(trash::restore_file),
        )
        .route("/organizations/{org_id}/trash", get(trash::list_trash))
        .route_layer(axum::middleware::from_fn(
            crate::middleware::identity_middleware,
        ))
}

/// Scheduler-facing cron commands, guarded by the shared bearer secret.
///
/// Outside production the same handlers are additionally reachable via GET
/// without the secret, for manual testing; the auth middleware waves those
/// requests through.
pub fn cron_routes(state: AppState) -> Router<AppState> {
    let dev = !state.config.server.environment.is_production();

    let notify = post(cron::archive_expiry_notifications);
    let archives = post(cron::cleanup_archives);
    let trash = post(cron::cleanup_file_trash);

    let (notify, archives, trash) = if dev {
        (
            notify.get(cron::archive_expiry_notifications),
            archives.get(cron::cleanup_archives),
            trash.get(cron::cleanup_file_trash),
        )
    } else {
        (notify, archives, trash)
    };

    Router::new()
        .route("/archive-expiry-notifications", notify)
        .route("/cleanup-archives", archives)
        .route("/cleanup-file-trash", trash)
        .route_layer(from_fn_with_state(
            state,
            crate::middleware::cron_auth_middleware,
        ))
}
