//! Port interfaces for sync operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldsync_domain::{
    EntityBatch, EntityType, PageEnvelope, PersistSummary, RawRecord, Result, SyncMetadata,
};

/// Trait for reading paginated collections from the remote API
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch one page; `page_number` is 1-based
    async fn fetch_page(
        &self,
        entity: EntityType,
        page_number: u32,
        page_size: u32,
    ) -> Result<PageEnvelope>;

    /// Fetch the raw KYC documents of one customer
    ///
    /// A customer without documents yields an empty list, not an error.
    async fn fetch_customer_documents(&self, customer_id: &str) -> Result<Vec<RawRecord>>;
}

/// Trait for committing validated records to the local cache
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist every page of one entity in a single transaction
    ///
    /// Either all records of the batch are written or none are.
    async fn persist_all(&self, batch: EntityBatch) -> Result<PersistSummary>;
}

/// Trait for per-entity sync bookkeeping
#[async_trait]
pub trait SyncMetadataStore: Send + Sync {
    /// Record a committed batch, merging `pages` into the loaded page set
    async fn record_sync(
        &self,
        entity: EntityType,
        synced_at: DateTime<Utc>,
        record_count: usize,
        pages: &[u32],
    ) -> Result<SyncMetadata>;

    /// Get metadata for an entity, if it was ever synced
    async fn get(&self, entity: EntityType) -> Result<Option<SyncMetadata>>;
}

/// Source of wall-clock time for the run guard and metadata stamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
