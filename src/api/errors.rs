use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use tracing::error;

use crate::errors::Error;

/// Message returned whenever a todo id does not resolve
pub const TODO_NOT_FOUND: &str = "Todo not found";

/// Error payload returned by every endpoint: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip)]
    pub code: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiError({}, {})", self.code, self.error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

/// Helper function to create API errors
pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    ApiError {
        error: message.to_string(),
        code: status.as_u16(),
    }
}

impl ApiError {
    /// 400 with a description of what was wrong with the request
    pub fn bad_request(message: &str) -> Self {
        api_error(StatusCode::BAD_REQUEST, message)
    }

    /// 404 for a todo id that does not exist
    pub fn todo_not_found() -> Self {
        api_error(StatusCode::NOT_FOUND, TODO_NOT_FOUND)
    }

    /// 500 for a store failure.
    ///
    /// The cause is always logged. It is only sent to the client when
    /// `expose` is set (test mode).
    pub fn internal(cause: &Error, expose: bool) -> Self {
        error!("Request failed: {}", cause);
        if expose {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, &cause.to_string())
        } else {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
