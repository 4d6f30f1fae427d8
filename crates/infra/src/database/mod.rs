//! SQLite datastore: pool, schema, per-entity DAOs and the port adapters

pub mod daos;
pub mod manager;
pub mod metadata_repository;
pub mod record_store;

pub use manager::{DbConnection, DbManager, SCHEMA_VERSION};
pub use metadata_repository::SqliteSyncMetadataRepository;
pub use record_store::SqliteRecordStore;
