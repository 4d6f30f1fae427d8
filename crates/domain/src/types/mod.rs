//! Domain types and models
//!
//! Records pulled from the remote API, and the types describing a sync run.

pub mod entity;
pub mod records;
pub mod serde_helpers;
pub mod sync;

pub use entity::EntityType;
pub use records::{
    Customer, CustomerBundle, KycDocument, KycStatus, Lead, Quotation, RawRecord, SyncStatus,
};
pub use sync::{
    EntityBatch, FailureReason, PageEnvelope, PersistSummary, RawPage, RecordCounts, SkipReason,
    SyncEvent, SyncMetadata, SyncProgress, SyncResult, ValidatedPage,
};
