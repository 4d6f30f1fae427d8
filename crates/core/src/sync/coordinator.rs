//! Sync coordinator - orchestrates one pull run across all entities

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use fieldsync_domain::{
    CustomerBundle, EntityBatch, EntityType, KycDocument, PersistSummary, RawPage, RecordCounts,
    SyncConfig, SyncEvent, SyncResult, ValidatedPage,
};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use super::classifier::classify;
use super::errors::EntitySyncError;
use super::guard::SyncGuard;
use super::pagination::fetch_all_pages;
use super::ports::{Clock, RecordStore, RemoteSource, SyncMetadataStore, SystemClock};
use super::progress::ProgressEmitter;
use super::validation::{
    derive_kyc_status, validate_customers, validate_documents, validate_leads,
    validate_quotations,
};

/// Tunables of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub page_size: u32,
    pub throttle_window: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            page_size: config.page_size,
            throttle_window: Duration::from_secs(config.throttle_window_secs),
        }
    }
}

/// Running totals of one run
#[derive(Debug, Default)]
struct RunTally {
    counts: RecordCounts,
    pages_processed: u32,
}

impl RunTally {
    fn add_pages(&mut self, pages: &[u32]) {
        self.pages_processed =
            self.pages_processed.saturating_add(u32::try_from(pages.len()).unwrap_or(u32::MAX));
    }
}

/// Reconciles the remote collections into the local cache.
///
/// Leads are the primary entity: any failure there fails the run.
/// Customers (with their KYC documents) and quotations are secondary and are
/// each synced best-effort after leads committed.
pub struct SyncCoordinator {
    source: Arc<dyn RemoteSource>,
    store: Arc<dyn RecordStore>,
    metadata: Arc<dyn SyncMetadataStore>,
    clock: Arc<dyn Clock>,
    guard: SyncGuard,
    emitter: ProgressEmitter,
    page_size: u32,
}

impl SyncCoordinator {
    /// Create a new coordinator using the system clock
    pub fn new(
        source: Arc<dyn RemoteSource>,
        store: Arc<dyn RecordStore>,
        metadata: Arc<dyn SyncMetadataStore>,
        settings: SyncSettings,
    ) -> Self {
        let throttle = chrono::Duration::from_std(settings.throttle_window)
            .unwrap_or_else(|_| chrono::Duration::weeks(52));
        Self {
            source,
            store,
            metadata,
            clock: Arc::new(SystemClock),
            guard: SyncGuard::new(throttle),
            emitter: ProgressEmitter::default(),
            page_size: settings.page_size.max(1),
        }
    }

    /// Replace the clock used for throttling and timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Completion time of the last successful run
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.guard.last_success_at()
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.emitter.subscribe()
    }

    /// Run one sync.
    ///
    /// Returns immediately with a skipped result when another run holds the
    /// guard or the throttle window has not elapsed. Never returns an error:
    /// failures are reported in the result.
    #[instrument(skip(self))]
    pub async fn run(&self, trigger: &str) -> SyncResult {
        let started_at = self.clock.now();
        let permit = match self.guard.try_acquire(started_at) {
            Ok(permit) => permit,
            Err(reason) => {
                info!(trigger, reason = reason.message(), "Sync run skipped");
                return SyncResult::skipped(trigger, reason, started_at);
            }
        };

        info!(trigger, "Sync run started");
        self.emitter.emit(SyncEvent::Started { trigger: trigger.to_string(), started_at });

        let timer = Instant::now();
        let mut tally = RunTally::default();
        let outcome = self.sync_entities(started_at, &mut tally).await;
        let duration = timer.elapsed();

        let result = match outcome {
            Ok(()) => {
                permit.mark_success(self.clock.now());
                SyncResult {
                    trigger: trigger.to_string(),
                    success: true,
                    record_counts: tally.counts,
                    duration,
                    pages_processed: tally.pages_processed,
                    failure_reason: None,
                    error: None,
                    skipped: None,
                    started_at,
                }
            }
            Err(err) => SyncResult {
                trigger: trigger.to_string(),
                success: false,
                record_counts: tally.counts,
                duration,
                pages_processed: tally.pages_processed,
                failure_reason: Some(classify(&err)),
                error: Some(err.to_string()),
                skipped: None,
                started_at,
            },
        };
        drop(permit);

        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        if result.success {
            info!(
                trigger,
                duration_ms,
                leads = result.record_counts.leads,
                customers = result.record_counts.customers,
                documents = result.record_counts.documents,
                quotations = result.record_counts.quotations,
                "Sync run finished"
            );
            self.emitter.emit(SyncEvent::Finished(result.clone()));
        } else {
            warn!(
                trigger,
                duration_ms,
                reason = ?result.failure_reason,
                error = result.error.as_deref().unwrap_or_default(),
                "Sync run failed"
            );
            self.emitter.emit(SyncEvent::Failed(result.clone()));
        }
        result
    }

    async fn sync_entities(
        &self,
        started_at: DateTime<Utc>,
        tally: &mut RunTally,
    ) -> Result<(), EntitySyncError> {
        self.sync_leads(started_at, tally).await?;

        if let Err(err) = self.sync_customers(started_at, tally).await {
            log_secondary_failure(&err);
        }
        if let Err(err) = self.sync_quotations(started_at, tally).await {
            log_secondary_failure(&err);
        }

        Ok(())
    }

    async fn sync_leads(
        &self,
        started_at: DateTime<Utc>,
        tally: &mut RunTally,
    ) -> Result<(), EntitySyncError> {
        let raw_pages =
            fetch_all_pages(self.source.as_ref(), &self.emitter, EntityType::Leads, self.page_size)
                .await?;
        let pages = raw_pages.iter().map(validate_leads).collect();

        let summary = self.commit(EntityBatch::Leads(pages), started_at).await?;
        tally.counts.leads = summary.records;
        tally.add_pages(&summary.pages);
        Ok(())
    }

    async fn sync_customers(
        &self,
        started_at: DateTime<Utc>,
        tally: &mut RunTally,
    ) -> Result<(), EntitySyncError> {
        let raw_pages = fetch_all_pages(
            self.source.as_ref(),
            &self.emitter,
            EntityType::Customers,
            self.page_size,
        )
        .await?;

        let mut pages = Vec::with_capacity(raw_pages.len());
        for raw_page in &raw_pages {
            let validated = validate_customers(raw_page);
            let mut bundles = Vec::with_capacity(validated.records.len());
            for mut customer in validated.records {
                // One request per customer
                let documents = self.fetch_documents(&customer.id).await;
                customer.kyc_status = derive_kyc_status(&documents);
                bundles.push(CustomerBundle { customer, documents });
            }
            pages.push(ValidatedPage {
                page_number: validated.page_number,
                records: bundles,
                total_count: validated.total_count,
            });
        }

        let summary = self.commit(EntityBatch::Customers(pages), started_at).await?;
        self.record_metadata(EntityType::KycDocuments, started_at, summary.documents, &[])
            .await;
        tally.counts.customers = summary.records;
        tally.counts.documents = summary.documents;
        tally.add_pages(&summary.pages);
        Ok(())
    }

    async fn sync_quotations(
        &self,
        started_at: DateTime<Utc>,
        tally: &mut RunTally,
    ) -> Result<(), EntitySyncError> {
        let raw_pages = match fetch_all_pages(
            self.source.as_ref(),
            &self.emitter,
            EntityType::Quotations,
            self.page_size,
        )
        .await
        {
            Ok(raw_pages) => raw_pages,
            Err(err) if err.is_unavailable() => {
                info!(entity = %EntityType::Quotations, "Quotations not available remotely; skipping");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let pages = raw_pages.iter().map(validate_quotations).collect();

        let summary = self.commit(EntityBatch::Quotations(pages), started_at).await?;
        tally.counts.quotations = summary.records;
        tally.add_pages(&summary.pages);
        Ok(())
    }

    /// Documents of one customer. A failed fetch counts as no documents.
    async fn fetch_documents(&self, customer_id: &str) -> Vec<KycDocument> {
        match self.source.fetch_customer_documents(customer_id).await {
            Ok(items) => {
                let page = RawPage { entity: EntityType::KycDocuments, page_number: 1, items };
                validate_documents(&page).records
            }
            Err(err) => {
                warn!(customer_id, error = %err, "Failed to fetch KYC documents; assuming none");
                Vec::new()
            }
        }
    }

    /// Commit an entity batch, then update its metadata.
    async fn commit(
        &self,
        batch: EntityBatch,
        started_at: DateTime<Utc>,
    ) -> Result<PersistSummary, EntitySyncError> {
        let entity = batch.entity();
        let summary = self
            .store
            .persist_all(batch)
            .await
            .map_err(|source| EntitySyncError::Persist { entity, source })?;

        info!(entity = %entity, records = summary.records, pages = ?summary.pages, "Committed entity");
        self.record_metadata(entity, started_at, summary.records, &summary.pages).await;
        Ok(summary)
    }

    /// Best-effort: a failure here is logged and does not undo the commit.
    async fn record_metadata(
        &self,
        entity: EntityType,
        synced_at: DateTime<Utc>,
        record_count: usize,
        pages: &[u32],
    ) {
        if let Err(err) = self.metadata.record_sync(entity, synced_at, record_count, pages).await {
            warn!(entity = %entity, error = %err, "Failed to update sync metadata");
        }
    }
}

fn log_secondary_failure(err: &EntitySyncError) {
    warn!(
        entity = %err.entity(),
        reason = %classify(err),
        error = %err,
        "Secondary entity sync failed; continuing"
    );
}
