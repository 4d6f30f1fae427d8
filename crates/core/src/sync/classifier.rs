//! Failure categorization for run reports
//!
//! The category is advisory. It never changes control flow.

use fieldsync_domain::{EntityType, FailureReason, FieldSyncError};

use super::errors::EntitySyncError;

const AUTH_KEYWORDS: &[&str] =
    &["unauthorized", "forbidden", "authentication", "access token", "401", "403"];
const NETWORK_KEYWORDS: &[&str] =
    &["network", "timeout", "timed out", "connection", "connect", "dns", "unreachable"];
const DATABASE_KEYWORDS: &[&str] = &["database", "sqlite", "constraint", "transaction"];
const VALIDATION_KEYWORDS: &[&str] = &["validation", "invalid", "malformed", "missing"];

/// Categorize an entity failure.
///
/// Authentication wins over everything. A leads page that fails after page 1
/// made it through means the primary entity is incomplete.
pub fn classify(err: &EntitySyncError) -> FailureReason {
    let reason = classify_error(err.cause());
    if reason == FailureReason::AuthenticationError {
        return reason;
    }
    match err {
        EntitySyncError::PageFetch { entity: EntityType::Leads, page, .. } if *page > 1 => {
            FailureReason::LeadsIncomplete
        }
        _ => reason,
    }
}

/// Categorize a bare error: by variant first, then by message keywords.
pub fn classify_error(err: &FieldSyncError) -> FailureReason {
    match err {
        FieldSyncError::Auth(_) => FailureReason::AuthenticationError,
        FieldSyncError::Network(_) => FailureReason::NetworkError,
        FieldSyncError::Validation(_) => FailureReason::ValidationError,
        FieldSyncError::Database(_) => FailureReason::DatabaseError,
        other => classify_message(other.message()),
    }
}

fn classify_message(message: &str) -> FailureReason {
    let message = message.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|kw| message.contains(kw));

    if mentions(AUTH_KEYWORDS) {
        FailureReason::AuthenticationError
    } else if mentions(NETWORK_KEYWORDS) {
        FailureReason::NetworkError
    } else if mentions(DATABASE_KEYWORDS) {
        FailureReason::DatabaseError
    } else if mentions(VALIDATION_KEYWORDS) {
        FailureReason::ValidationError
    } else {
        FailureReason::Unknown
    }
}
