//! # FieldSync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP client with transport retry, and the remote API client
//! - SQLite datastore: pool, schema, DAOs, atomic record store, sync metadata
//! - Configuration loading and tracing initialization
//! - Engine wiring ([`SyncContext`])
//!
//! ## Architecture
//! - Implements traits defined in `fieldsync-core`
//! - Contains all "impure" code (network and disk I/O)

pub mod api;
pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ApiClient, ApiClientConfig, ApiError, StaticTokenProvider};
pub use context::SyncContext;
pub use database::{DbManager, SqliteRecordStore, SqliteSyncMetadataRepository};
pub use errors::InfraError;
pub use http::{HttpClient, RetryPolicy};
pub use observability::init_tracing;
