//! API-specific error types
//!
//! Classifies API failures and maps them onto the domain error.

use fieldsync_domain::FieldSyncError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401 / 403, or no token available
    Authentication,
    /// 404
    NotFound,
    /// Other 4xx - the request itself is wrong
    Client,
    /// 5xx
    Server,
    /// No response received
    Network,
    /// Response arrived but the envelope is unusable
    Payload,
    /// Misconfigured client
    Config,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response payload: {0}")]
    Payload(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::NotFound(_) => ApiErrorCategory::NotFound,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Payload(_) => ApiErrorCategory::Payload,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Map a non-success status, keeping a short body excerpt for context.
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let excerpt: String = body.chars().take(200).collect();
        let message = format!(
            "HTTP {} {} for {url}{}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status"),
            if excerpt.is_empty() { String::new() } else { format!(": {excerpt}") }
        );
        match status.as_u16() {
            401 | 403 => Self::Auth(message),
            404 => Self::NotFound(message),
            400..=499 => Self::Client(message),
            _ => Self::Server(message),
        }
    }
}

impl From<ApiError> for FieldSyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(msg) => FieldSyncError::Auth(msg),
            ApiError::NotFound(msg) => FieldSyncError::NotFound(msg),
            ApiError::Client(msg) => FieldSyncError::InvalidInput(msg),
            ApiError::Server(msg) | ApiError::Network(msg) => FieldSyncError::Network(msg),
            ApiError::Payload(msg) => FieldSyncError::Validation(msg),
            ApiError::Config(msg) => FieldSyncError::Config(msg),
        }
    }
}

impl From<FieldSyncError> for ApiError {
    fn from(err: FieldSyncError) -> Self {
        match err {
            FieldSyncError::Auth(msg) => Self::Auth(msg),
            FieldSyncError::NotFound(msg) => Self::NotFound(msg),
            FieldSyncError::Network(msg) => Self::Network(msg),
            FieldSyncError::Validation(msg) => Self::Payload(msg),
            FieldSyncError::Config(msg) => Self::Config(msg),
            FieldSyncError::InvalidInput(msg)
            | FieldSyncError::Database(msg)
            | FieldSyncError::Internal(msg) => Self::Client(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_categories() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ApiErrorCategory::Authentication),
            (StatusCode::FORBIDDEN, ApiErrorCategory::Authentication),
            (StatusCode::NOT_FOUND, ApiErrorCategory::NotFound),
            (StatusCode::UNPROCESSABLE_ENTITY, ApiErrorCategory::Client),
            (StatusCode::BAD_GATEWAY, ApiErrorCategory::Server),
        ];
        for (status, category) in cases {
            assert_eq!(ApiError::from_status(status, "/leads", "").category(), category);
        }
    }

    #[test]
    fn domain_mapping_follows_category() {
        let server: FieldSyncError = ApiError::Server("HTTP 500".into()).into();
        assert!(matches!(server, FieldSyncError::Network(_)));

        let client: FieldSyncError = ApiError::Client("HTTP 422".into()).into();
        assert!(matches!(client, FieldSyncError::InvalidInput(_)));

        let payload: FieldSyncError = ApiError::Payload("missing data".into()).into();
        assert!(matches!(payload, FieldSyncError::Validation(_)));
    }

    #[test]
    fn status_message_includes_body_excerpt() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "/leads", "limit too large");
        assert_eq!(err.to_string(), "Client error: HTTP 400 Bad Request for /leads: limit too large");
    }
}
