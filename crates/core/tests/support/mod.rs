//! In-memory port implementations for coordinator tests
//!
//! Provides scripted remote sources, an in-memory record store and metadata
//! store, and a manual clock, enabling deterministic runs without HTTP or
//! SQLite.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fieldsync_core::{Clock, RecordStore, RemoteSource, SyncMetadataStore};
use fieldsync_domain::{
    EntityBatch, EntityType, FieldSyncError, PageEnvelope, PersistSummary, RawRecord,
    Result as DomainResult, SyncMetadata,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Remote source answering from per-page scripts.
///
/// Entities without a script answer with an empty collection.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<(EntityType, u32), DomainResult<PageEnvelope>>>,
    documents: Mutex<HashMap<String, DomainResult<Vec<RawRecord>>>>,
    calls: Mutex<Vec<(EntityType, u32, u32)>>,
    document_calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the first leads request until the gate is notified.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::default() }
    }

    pub fn with_page(
        self,
        entity: EntityType,
        page: u32,
        response: DomainResult<PageEnvelope>,
    ) -> Self {
        self.pages.lock().insert((entity, page), response);
        self
    }

    pub fn with_documents(self, customer_id: &str, response: DomainResult<Vec<RawRecord>>) -> Self {
        self.documents.lock().insert(customer_id.to_string(), response);
        self
    }

    /// Every `(entity, page, page_size)` requested, in order
    pub fn calls(&self) -> Vec<(EntityType, u32, u32)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, entity: EntityType) -> Vec<u32> {
        self.calls.lock().iter().filter(|(e, _, _)| *e == entity).map(|(_, p, _)| *p).collect()
    }

    pub fn document_calls(&self) -> Vec<String> {
        self.document_calls.lock().clone()
    }
}

#[async_trait]
impl RemoteSource for ScriptedSource {
    async fn fetch_page(
        &self,
        entity: EntityType,
        page_number: u32,
        page_size: u32,
    ) -> DomainResult<PageEnvelope> {
        self.calls.lock().push((entity, page_number, page_size));
        if entity == EntityType::Leads && page_number == 1 {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
        let scripted = self.pages.lock().get(&(entity, page_number)).cloned();
        scripted.unwrap_or_else(|| Ok(envelope(Vec::new(), 0, 0, u64::from(page_size))))
    }

    async fn fetch_customer_documents(&self, customer_id: &str) -> DomainResult<Vec<RawRecord>> {
        self.document_calls.lock().push(customer_id.to_string());
        let scripted = self.documents.lock().get(customer_id).cloned();
        scripted.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Record store keeping committed batches in memory.
///
/// A failing entity commits nothing, like a rolled-back transaction.
#[derive(Default)]
pub struct MemoryStore {
    committed: Mutex<Vec<EntityBatch>>,
    failing: Mutex<HashSet<EntityType>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, entity: EntityType) -> Self {
        self.failing.lock().insert(entity);
        self
    }

    pub fn committed(&self) -> Vec<EntityBatch> {
        self.committed.lock().clone()
    }

    pub fn committed_for(&self, entity: EntityType) -> Option<EntityBatch> {
        self.committed.lock().iter().find(|batch| batch.entity() == entity).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn persist_all(&self, batch: EntityBatch) -> DomainResult<PersistSummary> {
        let entity = batch.entity();
        if self.failing.lock().contains(&entity) {
            return Err(FieldSyncError::Database(format!("constraint failed for {entity}")));
        }
        let summary = PersistSummary {
            records: batch.record_count(),
            documents: batch.document_count(),
            pages: batch.page_numbers(),
        };
        self.committed.lock().push(batch);
        Ok(summary)
    }
}

/// Metadata store with the same page-union semantics as the SQLite one
#[derive(Default)]
pub struct MemoryMetadata {
    rows: Mutex<HashMap<EntityType, SyncMetadata>>,
    failing: bool,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }
}

#[async_trait]
impl SyncMetadataStore for MemoryMetadata {
    async fn record_sync(
        &self,
        entity: EntityType,
        synced_at: DateTime<Utc>,
        record_count: usize,
        pages: &[u32],
    ) -> DomainResult<SyncMetadata> {
        if self.failing {
            return Err(FieldSyncError::Database("metadata table locked".into()));
        }
        let mut rows = self.rows.lock();
        let existing = rows.get(&entity).map(|row| row.pages_loaded.clone()).unwrap_or_default();
        let row = SyncMetadata {
            entity,
            last_synced_at: synced_at,
            record_count,
            pages_loaded: SyncMetadata::merge_pages(&existing, pages),
        };
        rows.insert(entity, row.clone());
        Ok(row)
    }

    async fn get(&self, entity: EntityType) -> DomainResult<Option<SyncMetadata>> {
        Ok(self.rows.lock().get(&entity).cloned())
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()) }
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

pub fn envelope(items: Vec<Value>, total: u64, offset: u64, limit: u64) -> PageEnvelope {
    PageEnvelope { success: true, items, total, offset, limit }
}

pub fn lead(id: &str) -> Value {
    json!({
        "id": id,
        "customerName": "Meera Iyer",
        "phone": "+91-9000000001",
        "address": "4 Residency Road",
        "status": "new",
        "services": ["rooftop-solar"],
        "assignedTo": "agent-1",
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-02T10:00:00Z"
    })
}

pub fn leads(prefix: &str, count: usize) -> Vec<Value> {
    (1..=count).map(|i| lead(&format!("{prefix}-{i}"))).collect()
}

pub fn customer(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Meera Iyer",
        "phone": "+91-9000000001",
        "leadId": "lead-1",
        "createdAt": "2024-05-03T10:00:00Z",
        "updatedAt": "2024-05-03T10:00:00Z"
    })
}

pub fn document(id: &str, customer_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "customerId": customer_id,
        "documentType": "aadhaar",
        "status": status
    })
}

pub fn quotation(id: &str) -> Value {
    json!({
        "id": id,
        "leadId": "lead-1",
        "customerName": "Meera Iyer",
        "totalAmount": 185000,
        "status": "sent",
        "createdAt": "2024-05-04T10:00:00Z"
    })
}
