//! # FieldSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the remote API, the record store and sync
//!   metadata
//! - Record validation and KYC derivation
//! - The sync coordinator with its run guard and progress events
//!
//! ## Architecture Principles
//! - Only depends on `fieldsync-domain`
//! - No database or HTTP code
//! - All external dependencies via traits

pub mod sync;

pub use sync::classifier::{classify, classify_error};
pub use sync::coordinator::{SyncCoordinator, SyncSettings};
pub use sync::errors::EntitySyncError;
pub use sync::ports::{Clock, RecordStore, RemoteSource, SyncMetadataStore, SystemClock};
pub use sync::progress::ProgressEmitter;
