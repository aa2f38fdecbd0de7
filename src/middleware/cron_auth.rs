//! Bearer-secret authentication for the scheduler-facing /cron endpoints.
//!
//! The external scheduler authenticates with `Authorization: Bearer
//! <cron_secret>`. An unset secret is a deployment misconfiguration and
//! yields 500 rather than silently letting the jobs be triggered by anyone.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{AppState, routes::ApiError};

/// Middleware guarding the cron routes with the shared scheduler secret.
pub async fn cron_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // The GET variants of the cron routes exist only outside production and
    // are exempt from the secret, for manual testing.
    if req.method() == http::Method::GET && !state.config.server.environment.is_production() {
        return Ok(next.run(req).await);
    }

    let Some(secret) = state.config.server.cron_secret.as_deref() else {
        return Err(ApiError::NotConfigured(
            "server.cron_secret is not configured".to_string(),
        ));
    };

    let presented = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    // Constant-time comparison; only the length of the secret can leak.
    if presented.as_bytes().ct_eq(secret.as_bytes()).into() {
        Ok(next.run(req).await)
    } else {
        Err(ApiError::Unauthorized)
    }
}
