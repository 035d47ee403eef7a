//! JSON HTTP API.
//!
//! All routes except `/api/health` run behind [`auth::require_session`],
//! which resolves the caller's session and stores a [`auth::CurrentUser`]
//! extension for the handlers.

pub mod auth;
pub mod server;

mod assistant;
mod inquiry;
mod personality;
mod tasks;

pub use server::{AppState, build_router, start_server};

use crate::error::{ApiError, ErrorCode};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

impl ErrorCode {
    /// HTTP status for this error code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::InvalidState | ErrorCode::ParentCycle => StatusCode::CONFLICT,
            ErrorCode::TaskNotFound | ErrorCode::PersonalityNotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ProviderError => StatusCode::BAD_GATEWAY,
            ErrorCode::ParseError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        }
        (status, Json(self)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_value("body", &rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_value("query", &rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_value("id", &rejection.body_text())
    }
}
