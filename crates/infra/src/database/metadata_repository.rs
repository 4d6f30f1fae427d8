//! Per-entity sync bookkeeping stored in `sync_metadata`

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use fieldsync_core::SyncMetadataStore;
use fieldsync_domain::{EntityType, FieldSyncError, Result as DomainResult, SyncMetadata};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::{map_sql_error, DbManager};
use crate::errors::map_join_error;

/// SQLite-backed [`SyncMetadataStore`]
pub struct SqliteSyncMetadataRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncMetadataRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Metadata of every entity synced at least once, in entity order.
    pub async fn list(&self) -> DomainResult<Vec<SyncMetadata>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<SyncMetadata>> {
            let conn = db.get_connection()?;
            let mut rows = Vec::new();
            for entity in EntityType::ALL {
                if let Some(row) = load(&conn, entity)? {
                    rows.push(row);
                }
            }
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl SyncMetadataStore for SqliteSyncMetadataRepository {
    #[instrument(skip(self, entity, pages), fields(entity = %entity))]
    async fn record_sync(
        &self,
        entity: EntityType,
        synced_at: DateTime<Utc>,
        record_count: usize,
        pages: &[u32],
    ) -> DomainResult<SyncMetadata> {
        let db = Arc::clone(&self.db);
        let pages = pages.to_vec();

        task::spawn_blocking(move || -> DomainResult<SyncMetadata> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let existing = load(&tx, entity)?.map(|row| row.pages_loaded).unwrap_or_default();
            let metadata = SyncMetadata {
                entity,
                last_synced_at: synced_at,
                record_count,
                pages_loaded: SyncMetadata::merge_pages(&existing, &pages),
            };

            let pages_json = serde_json::to_string(&metadata.pages_loaded)
                .map_err(|e| FieldSyncError::Internal(format!("failed to encode pages: {e}")))?;
            let count = i64::try_from(record_count)
                .map_err(|_| FieldSyncError::InvalidInput("record count overflow".into()))?;

            tx.execute(
                "INSERT INTO sync_metadata (entity, last_synced_at, record_count, pages_loaded)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(entity) DO UPDATE SET
                    last_synced_at = excluded.last_synced_at,
                    record_count = excluded.record_count,
                    pages_loaded = excluded.pages_loaded",
                params![
                    entity.as_str(),
                    synced_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    count,
                    pages_json,
                ],
            )
            .map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;

            debug!(pages = ?metadata.pages_loaded, record_count, "sync metadata recorded");
            Ok(metadata)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, entity: EntityType) -> DomainResult<Option<SyncMetadata>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<SyncMetadata>> {
            let conn = db.get_connection()?;
            load(&conn, entity)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn load(conn: &Connection, entity: EntityType) -> DomainResult<Option<SyncMetadata>> {
    let row = conn
        .query_row(
            "SELECT last_synced_at, record_count, pages_loaded FROM sync_metadata WHERE entity = ?1",
            params![entity.as_str()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?)),
        )
        .optional()
        .map_err(map_sql_error)?;

    let Some((synced_at, record_count, pages_json)) = row else {
        return Ok(None);
    };

    let last_synced_at = DateTime::parse_from_rfc3339(&synced_at)
        .map_err(|e| FieldSyncError::Database(format!("invalid last_synced_at for {entity}: {e}")))?
        .with_timezone(&Utc);
    let pages_loaded: Vec<u32> = serde_json::from_str(&pages_json)
        .map_err(|e| FieldSyncError::Database(format!("invalid pages_loaded for {entity}: {e}")))?;

    Ok(Some(SyncMetadata {
        entity,
        last_synced_at,
        record_count: usize::try_from(record_count).unwrap_or(0),
        pages_loaded,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn repository() -> (TempDir, SqliteSyncMetadataRepository) {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(DbManager::new(dir.path().join("meta.db"), 2).unwrap());
        db.run_migrations().unwrap();
        (dir, SqliteSyncMetadataRepository::new(db))
    }

    #[tokio::test]
    async fn unknown_entity_has_no_metadata() {
        let (_dir, repo) = repository();
        assert!(repo.get(EntityType::Leads).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pages_accumulate_without_duplicates() {
        let (_dir, repo) = repository();
        let first = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

        repo.record_sync(EntityType::Leads, first, 25, &[1]).await.unwrap();
        let merged = repo.record_sync(EntityType::Leads, second, 47, &[2, 1]).await.unwrap();

        assert_eq!(merged.pages_loaded, vec![1, 2]);

        let stored = repo.get(EntityType::Leads).await.unwrap().unwrap();
        assert_eq!(stored.last_synced_at, second);
        assert_eq!(stored.record_count, 47);
        assert_eq!(stored.pages_loaded, vec![1, 2]);
    }

    #[tokio::test]
    async fn list_returns_synced_entities_in_order() {
        let (_dir, repo) = repository();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        repo.record_sync(EntityType::Quotations, at, 3, &[1]).await.unwrap();
        repo.record_sync(EntityType::KycDocuments, at, 4, &[]).await.unwrap();

        let entities: Vec<_> = repo.list().await.unwrap().into_iter().map(|m| m.entity).collect();
        assert_eq!(entities, vec![EntityType::KycDocuments, EntityType::Quotations]);
    }
}
