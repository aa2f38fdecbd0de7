use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    closure::ClosureError,
    db::DbError,
    models::OrganizationStatus,
    services::FileTrashError,
};

/// Wire format for error responses: a stable machine-readable code plus
/// human detail text.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
            },
        }
    }
}

/// API-level error taxonomy, mapped onto HTTP in one place.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Forbidden(String),
    AlreadyClosed(OrganizationStatus),
    CannotClose(String),
    Conflict(String),
    Unauthorized,
    NotConfigured(String),
    Database(DbError),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DbError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Database(other),
        }
    }
}

impl From<ClosureError> for ApiError {
    fn from(err: ClosureError) -> Self {
        match err {
            ClosureError::NotFound => ApiError::NotFound("Organization not found".to_string()),
            ClosureError::Forbidden => ApiError::Forbidden(err.to_string()),
            ClosureError::AlreadyClosed(status) => ApiError::AlreadyClosed(status),
            ClosureError::CannotClose { .. } => ApiError::CannotClose(err.to_string()),
            ClosureError::Database(db) => ApiError::Database(db),
        }
    }
}

impl From<FileTrashError> for ApiError {
    fn from(err: FileTrashError) -> Self {
        match err {
            FileTrashError::OrganizationNotFound
            | FileTrashError::FileNotFound(_)
            | FileTrashError::NotInTrash(_) => ApiError::NotFound(err.to_string()),
            FileTrashError::AlreadyTrashed(_) => ApiError::Conflict(err.to_string()),
            FileTrashError::Database(db) => ApiError::Database(db),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::AlreadyClosed(status) => (
                StatusCode::CONFLICT,
                "already_closed",
                format!("Organization is already {}", status),
            ),
            ApiError::CannotClose(msg) => (StatusCode::BAD_REQUEST, "cannot_close", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::NotConfigured(msg) => {
                tracing::error!(detail = %msg, "Endpoint hit with missing configuration");
                (StatusCode::INTERNAL_SERVER_ERROR, "not_configured", msg)
            }
            ApiError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "An internal database error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Blocker;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn cannot_close_maps_to_400_with_blocker_listing() {
        let closure_err = ClosureError::CannotClose {
            blockers: vec![Blocker::blocking(
                "wallet",
                "outstanding_balance",
                "Outstanding wallet balance",
                "",
            )],
        };
        let (status, json) = body_json(ApiError::from(closure_err)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "cannot_close");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("wallet: Outstanding wallet balance")
        );
    }

    #[tokio::test]
    async fn already_closed_maps_to_409() {
        let (status, json) = body_json(ApiError::AlreadyClosed(OrganizationStatus::Closed)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "already_closed");
    }

    #[tokio::test]
    async fn database_detail_is_not_leaked() {
        let (status, json) =
            body_json(ApiError::Database(DbError::Validation("secret detail".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "database_error");
        assert!(!json["error"]["message"].as_str().unwrap().contains("secret"));
    }
}
