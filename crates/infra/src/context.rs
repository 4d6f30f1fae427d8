//! Engine wiring - builds the coordinator from configuration
//!
//! Everything is constructed explicitly and owned by [`SyncContext`]; there
//! is no process-wide engine instance.

use std::sync::Arc;

use fieldsync_core::{RecordStore, RemoteSource, SyncCoordinator, SyncMetadataStore, SyncSettings};
use fieldsync_domain::{Config, FieldSyncError, Result};
use tracing::info;

use crate::api::{AccessTokenProvider, ApiClient, ApiClientConfig};
use crate::database::{DbManager, SqliteRecordStore, SqliteSyncMetadataRepository};

/// Holds the engine and the adapters it runs on
pub struct SyncContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub api: Arc<ApiClient>,
    pub records: Arc<SqliteRecordStore>,
    pub metadata: Arc<SqliteSyncMetadataRepository>,
    pub coordinator: Arc<SyncCoordinator>,
}

impl SyncContext {
    /// Open the datastore, apply migrations and wire the coordinator.
    ///
    /// # Errors
    /// Fails if the database cannot be opened or migrated, or the API client
    /// configuration is invalid.
    pub fn new(config: Config, token_provider: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let api = Arc::new(
            ApiClient::new(ApiClientConfig::from_config(&config), token_provider)
                .map_err(FieldSyncError::from)?,
        );
        let records = Arc::new(SqliteRecordStore::new(Arc::clone(&db)));
        let metadata = Arc::new(SqliteSyncMetadataRepository::new(Arc::clone(&db)));

        let coordinator = Arc::new(SyncCoordinator::new(
            Arc::clone(&api) as Arc<dyn RemoteSource>,
            Arc::clone(&records) as Arc<dyn RecordStore>,
            Arc::clone(&metadata) as Arc<dyn SyncMetadataStore>,
            SyncSettings::from(&config.sync),
        ));

        info!(
            api = %api.base_url(),
            db_path = %db.path().display(),
            page_size = config.sync.page_size,
            "sync engine ready"
        );

        Ok(Self { config, db, api, records, metadata, coordinator })
    }
}
