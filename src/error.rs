//! Structured error types for API responses.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (4xx-like)
    MissingRequiredField,
    InvalidFieldValue,
    InvalidState,
    ParentCycle,

    // Not found errors
    TaskNotFound,
    PersonalityNotFound,

    // Auth
    Unauthorized,

    // Completion provider
    ProviderError,
    ParseError,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error for API responses.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn personality_not_found() -> Self {
        Self::new(
            ErrorCode::PersonalityNotFound,
            "No personality profile has been saved",
        )
    }

    pub fn invalid_state(task_id: i64, from: &str, action: &str) -> Self {
        Self::new(
            ErrorCode::InvalidState,
            format!("Cannot {} task {} while it is {}", action, task_id, from),
        )
    }

    pub fn parent_cycle(task_id: i64, parent_id: i64) -> Self {
        Self::new(
            ErrorCode::ParentCycle,
            format!(
                "Setting parent of task {} to {} would create a cycle",
                task_id, parent_id
            ),
        )
        .with_field("parentId")
    }

    pub fn unauthorized(reason: &str) -> Self {
        Self::new(ErrorCode::Unauthorized, reason)
    }

    pub fn provider(err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProviderError,
            "Task generation failed, please retry",
        )
        .with_details(err.to_string())
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ParseError,
            "Task generation failed, please retry",
        )
        .with_details(reason)
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(db_err) => ApiError::database(db_err),
                Err(err) => ApiError::internal(err),
            },
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_preserves_api_error() {
        let err: anyhow::Error = ApiError::task_not_found(7).into();
        let api: ApiError = err.into();
        assert_eq!(api.code, ErrorCode::TaskNotFound);
        assert_eq!(api.message, "Task not found: 7");
    }

    #[test]
    fn test_plain_anyhow_becomes_internal() {
        let api: ApiError = anyhow::anyhow!("boom").into();
        assert_eq!(api.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(ApiError::missing_field("title")).unwrap();
        assert_eq!(json["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(json["field"], "title");
        assert!(json.get("details").is_none());
    }
}
