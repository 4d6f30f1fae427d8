//! Conversions from external infrastructure errors into domain errors.

use fieldsync_domain::FieldSyncError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FieldSyncError);

impl From<InfraError> for FieldSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FieldSyncError> for InfraError {
    fn from(value: FieldSyncError) -> Self {
        InfraError(value)
    }
}

trait IntoFieldSyncError {
    fn into_fieldsync(self) -> FieldSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → FieldSyncError */
/* -------------------------------------------------------------------------- */

impl IntoFieldSyncError for SqlError {
    fn into_fieldsync(self) -> FieldSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => FieldSyncError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        FieldSyncError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => FieldSyncError::Database(format!(
                        "constraint violation (code {}): {message}",
                        err.extended_code
                    )),
                    ErrorCode::DiskFull => FieldSyncError::Database("database disk is full".into()),
                    _ => FieldSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => FieldSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                FieldSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                FieldSyncError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => FieldSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => FieldSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_fieldsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → FieldSyncError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(FieldSyncError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FieldSyncError */
/* -------------------------------------------------------------------------- */

impl IntoFieldSyncError for HttpError {
    fn into_fieldsync(self) -> FieldSyncError {
        if self.is_timeout() {
            return FieldSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return FieldSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => FieldSyncError::Auth(message),
                404 => FieldSyncError::NotFound(message),
                400..=499 => FieldSyncError::InvalidInput(message),
                _ => FieldSyncError::Network(message),
            };
        }

        if self.is_decode() {
            return FieldSyncError::Validation(format!("malformed response body: {self}"));
        }

        FieldSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_fieldsync())
    }
}

/// Map a failed `spawn_blocking` join into the domain error.
pub fn map_join_error(err: JoinError) -> FieldSyncError {
    if err.is_cancelled() {
        FieldSyncError::Internal("blocking task cancelled".into())
    } else {
        FieldSyncError::Internal(format!("blocking task panicked: {err}"))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
