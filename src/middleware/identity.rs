//! Caller identity resolved from the upstream auth proxy.
//!
//! The platform's session layer terminates authentication ahead of this
//! service and forwards the authenticated user id in a trusted header. The
//! service must only be reachable through that proxy; requests without the
//! header are rejected.

use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::routes::ApiError;

/// Header carrying the authenticated user id, set by the upstream proxy.
pub const AUTH_USER_HEADER: &str = "X-Auth-User-Id";

/// The authenticated caller for the current request.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub user_id: Uuid,
}

/// Middleware that requires a valid `X-Auth-User-Id` header and exposes it
/// to handlers as a [`CallerIdentity`] extension.
pub async fn identity_middleware(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let user_id = req
        .headers()
        .get(AUTH_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CallerIdentity { user_id });
    Ok(next.run(req).await)
}
