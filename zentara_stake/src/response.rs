//! Standardized API response format

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::StakingError;

/// Standard API response structure
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(skip)]
    status: StatusCode,
}

/// API error structure
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            meta: None,
            status: StatusCode::OK,
        }
    }

    /// Create a successful response with metadata
    pub fn success_with_meta(data: T, meta: Value) -> Self {
        ApiResponse {
            meta: Some(meta),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response
    pub fn error(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
            meta: None,
            status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<StakingError> for ApiResponse<()> {
    fn from(err: StakingError) -> Self {
        ApiResponse::error(err.status_code(), err.error_code(), err.to_string())
    }
}

/// Helper functions for common responses
pub mod responses {
    use super::*;

    /// Success response with data
    pub fn ok<T: Serialize>(data: T) -> ApiResponse<T> {
        ApiResponse::success(data)
    }

    /// Success response with data and metadata
    pub fn ok_with_meta<T: Serialize>(data: T, meta: Value) -> ApiResponse<T> {
        ApiResponse::success_with_meta(data, meta)
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse::error(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Domain error mapped to its status and code
    pub fn staking_error(err: StakingError) -> ApiResponse<()> {
        err.into()
    }
}
