//! Sync run types: pages, batches, results, events and metadata

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityType;
use super::records::{CustomerBundle, Lead, Quotation, RawRecord};
use super::serde_helpers::duration_millis;

/// One page of a paginated collection, as returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    pub success: bool,
    pub items: Vec<RawRecord>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Raw items of one fetched page, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub entity: EntityType,
    pub page_number: u32,
    pub items: Vec<RawRecord>,
}

/// Records of one page that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPage<T> {
    pub page_number: u32,
    pub records: Vec<T>,
    /// Number of raw items the page contained
    pub total_count: usize,
}

impl<T> ValidatedPage<T> {
    pub fn valid_count(&self) -> usize {
        self.records.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.total_count.saturating_sub(self.records.len())
    }

    /// Fraction of raw items accepted; an empty page counts as fully valid.
    pub fn validation_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 1.0;
        }
        self.records.len() as f64 / self.total_count as f64
    }
}

/// Every validated page of one entity, committed as a single unit.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityBatch {
    Leads(Vec<ValidatedPage<Lead>>),
    Customers(Vec<ValidatedPage<CustomerBundle>>),
    Quotations(Vec<ValidatedPage<Quotation>>),
}

impl EntityBatch {
    pub fn entity(&self) -> EntityType {
        match self {
            Self::Leads(_) => EntityType::Leads,
            Self::Customers(_) => EntityType::Customers,
            Self::Quotations(_) => EntityType::Quotations,
        }
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        match self {
            Self::Leads(pages) => pages.iter().map(|p| p.page_number).collect(),
            Self::Customers(pages) => pages.iter().map(|p| p.page_number).collect(),
            Self::Quotations(pages) => pages.iter().map(|p| p.page_number).collect(),
        }
    }

    /// Top-level records in the batch (documents excluded).
    pub fn record_count(&self) -> usize {
        match self {
            Self::Leads(pages) => pages.iter().map(ValidatedPage::valid_count).sum(),
            Self::Customers(pages) => pages.iter().map(ValidatedPage::valid_count).sum(),
            Self::Quotations(pages) => pages.iter().map(ValidatedPage::valid_count).sum(),
        }
    }

    pub fn document_count(&self) -> usize {
        match self {
            Self::Customers(pages) => pages
                .iter()
                .flat_map(|page| page.records.iter())
                .map(|bundle| bundle.documents.len())
                .sum(),
            Self::Leads(_) | Self::Quotations(_) => 0,
        }
    }
}

/// Outcome of a committed entity batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub records: usize,
    pub documents: usize,
    pub pages: Vec<u32>,
}

/// Records persisted per entity during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub leads: usize,
    pub customers: usize,
    pub documents: usize,
    pub quotations: usize,
}

/// Categorized cause of a failed run, for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    NetworkError,
    ValidationError,
    DatabaseError,
    /// The primary entity could not complete its full page set
    LeadsIncomplete,
    AuthenticationError,
    #[default]
    Unknown,
}

impl FailureReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::LeadsIncomplete => "LEADS_INCOMPLETE",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run was rejected by the guard without doing any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyRunning,
    Throttled,
}

impl SkipReason {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "sync already in progress",
            Self::Throttled => "sync throttled",
        }
    }
}

/// Result of one `run` invocation. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub trigger: String,
    pub success: bool,
    pub record_counts: RecordCounts,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub pages_processed: u32,
    pub failure_reason: Option<FailureReason>,
    pub error: Option<String>,
    pub skipped: Option<SkipReason>,
    pub started_at: DateTime<Utc>,
}

impl SyncResult {
    /// Result for a run the guard refused to start.
    pub fn skipped(trigger: &str, reason: SkipReason, started_at: DateTime<Utc>) -> Self {
        Self {
            trigger: trigger.to_string(),
            success: false,
            record_counts: RecordCounts::default(),
            duration: Duration::ZERO,
            pages_processed: 0,
            failure_reason: None,
            error: Some(reason.message().to_string()),
            skipped: Some(reason),
            started_at,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Page-level progress of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub entity: EntityType,
    pub current_page: u32,
    pub total_pages: u32,
    /// Raw items fetched so far for this entity
    pub processed_records: usize,
    /// Total reported by the remote collection
    pub total_records: u64,
}

/// Lifecycle events broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SyncEvent {
    Started { trigger: String, started_at: DateTime<Utc> },
    Progress(SyncProgress),
    Finished(SyncResult),
    Failed(SyncResult),
}

impl SyncEvent {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Progress(_) => "progress",
            Self::Finished(_) => "finished",
            Self::Failed(_) => "failed",
        }
    }
}

/// Per-entity bookkeeping, written after a batch commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    pub entity: EntityType,
    pub last_synced_at: DateTime<Utc>,
    pub record_count: usize,
    /// Page numbers committed across runs, ascending and without duplicates
    pub pages_loaded: Vec<u32>,
}

impl SyncMetadata {
    /// Union of previously loaded pages with newly committed ones.
    pub fn merge_pages(existing: &[u32], committed: &[u32]) -> Vec<u32> {
        existing.iter().chain(committed.iter()).copied().collect::<BTreeSet<_>>().into_iter().collect()
    }
}
