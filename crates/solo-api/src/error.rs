//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use solo_store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for a second bid on the same job.
pub const DUPLICATE_BID_MESSAGE: &str = "You have already placed a bid on this job";

/// Message returned in place of server-side error details.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(e) => match e {
                StoreError::InvalidId(_) | StoreError::EmptyUpdate => StatusCode::BAD_REQUEST,
                StoreError::DuplicateBid { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal",
            ApiError::Validation(_) => "validation_error",
            ApiError::Store(e) => match e {
                StoreError::InvalidId(_) => "invalid_id",
                StoreError::EmptyUpdate => "empty_update",
                StoreError::DuplicateBid { .. } => "duplicate_bid",
                _ => "storage_error",
            },
        }
    }

    /// Client-facing message. Server-side failures never carry details here;
    /// see [`ErrorDetail`].
    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::BadRequest(m)
            | ApiError::Conflict(m)
            | ApiError::Validation(m) => m.clone(),
            ApiError::Store(StoreError::DuplicateBid { .. }) => DUPLICATE_BID_MESSAGE.to_string(),
            ApiError::Store(e) if e.is_client_error() => e.to_string(),
            ApiError::Internal(_) | ApiError::Store(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Full description of a server-side failure, attached to the response
/// extensions. Outside production `middleware::expose_error_details` puts it
/// in the body.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub code: &'static str,
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            message: self.message(),
            code: self.code(),
        };
        let mut response = (status, Json(body)).into_response();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            response.extensions_mut().insert(ErrorDetail {
                message: self.to_string(),
                code: self.code(),
            });
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(StoreError::invalid_id("x")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(StoreError::EmptyUpdate).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(StoreError::duplicate_bid("a@b.c", "65a1b2c3d4e5f6a7b8c9d0e1")).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::config("bad")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_stay_out_of_the_body() {
        let err = ApiError::internal("connection reset by peer");
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert!(detail.message.contains("connection reset by peer"));
        assert_eq!(detail.code, "internal");

        let response = ApiError::forbidden("Forbidden access!!").into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::unauthorized("Unauthorized access!!").message(), "Unauthorized access!!");
        assert_eq!(
            ApiError::from(StoreError::duplicate_bid("a@b.c", "65a1b2c3d4e5f6a7b8c9d0e1")).message(),
            DUPLICATE_BID_MESSAGE
        );
        assert_eq!(ApiError::forbidden("Forbidden access!!").code(), "forbidden");
    }
}
