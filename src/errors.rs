use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use sea_orm::{error::DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Body of every non-2xx API response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Reason phrase of the status code
    #[schema(example = "Unprocessable Entity")]
    pub error: String,
    #[schema(example = "Insufficient stock: product 7 has 2 units, 3 requested")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Same value as the `x-request-id` response header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}

// Extractor rejections render through `ErrorResponse` like every other
// failure. Malformed input is a validation error; a missing or wrong
// content type is a bad request.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                Self::ValidationError(rejection.body_text())
            }
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(_) => {
                Self::ValidationError(rejection.body_text())
            }
            other => Self::InternalError(other.body_text()),
        }
    }
}

impl ServiceError {
    /// A unique-index rejection becomes `Conflict(conflict)`; anything else
    /// stays a database error.
    pub fn from_write(err: DbErr, conflict: impl Into<String>) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            Self::Conflict(conflict.into())
        } else {
            Self::DatabaseError(err)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        use ServiceError::*;
        match self {
            NotFound(_) => StatusCode::NOT_FOUND,
            Conflict(_) => StatusCode::CONFLICT,
            InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError(_) | BadRequest(_) => StatusCode::BAD_REQUEST,
            DatabaseError(_) | InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show a client. Server-side failures are logged here and
    /// replaced by a generic message.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(err) => {
                tracing::error!(error = %err, "request failed on a database error");
                INTERNAL_MESSAGE.to_string()
            }
            Self::InternalError(reason) => {
                tracing::error!(%reason, "request failed on an internal error");
                INTERNAL_MESSAGE.to_string()
            }
            client_error => {
                tracing::debug!(status = %self.status_code(), error = %client_error, "request rejected");
                client_error.to_string()
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            request_id: crate::tracing::current_request_id().map(|id| id.to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracing::{scope_request_id, RequestId};
    use axum::body::to_bytes;
    use rstest::rstest;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn body_carries_scoped_request_id() {
        let response = scope_request_id(RequestId::new("req-123"), async {
            ServiceError::NotFound("product 9".into()).into_response()
        })
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert_eq!(body.request_id.as_deref(), Some("req-123"));
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Not found: product 9");
    }

    #[tokio::test]
    async fn body_omits_request_id_outside_a_request() {
        let body = body_of(ServiceError::BadRequest("bad window".into()).into_response()).await;
        assert!(body.request_id.is_none());
        assert_eq!(body.error, "Bad Request");
    }

    #[rstest]
    #[case(ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND)]
    #[case(ServiceError::Conflict("x".into()), StatusCode::CONFLICT)]
    #[case(ServiceError::InsufficientStock("x".into()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(ServiceError::ValidationError("x".into()), StatusCode::BAD_REQUEST)]
    #[case(ServiceError::BadRequest("x".into()), StatusCode::BAD_REQUEST)]
    #[case(ServiceError::InternalError("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ServiceError::DatabaseError(DbErr::Custom("boom".into())), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_to_status(#[case] err: ServiceError, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn server_side_details_are_not_echoed() {
        let db = ServiceError::DatabaseError(DbErr::Custom("connection reset".into()));
        assert_eq!(db.response_message(), INTERNAL_MESSAGE);
        let internal = ServiceError::InternalError("bucket overflow".into());
        assert_eq!(internal.response_message(), INTERNAL_MESSAGE);
        assert_eq!(
            ServiceError::InsufficientStock("2 available".into()).response_message(),
            "Insufficient stock: 2 available"
        );
    }

    #[test]
    fn other_write_failures_stay_database_errors() {
        let err = ServiceError::from_write(DbErr::Custom("disk full".into()), "duplicate");
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }
}
