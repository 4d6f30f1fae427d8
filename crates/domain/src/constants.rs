//! Engine constants
//!
//! Centralized defaults shared by configuration, validation and the
//! coordinator.

// Pagination
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Upper bound on pages fetched for one entity in one run
pub const MAX_PAGES_PER_ENTITY: u32 = 10_000;

// Run guard
pub const DEFAULT_THROTTLE_WINDOW_SECS: u64 = 30;

// HTTP retry policy (1s -> 2s -> 4s, capped at 5s)
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Local datastore
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

// Record defaults for fields absent from the wire format
pub const DEFAULT_LEAD_PRIORITY: &str = "medium";

// Required wire fields per entity
pub const LEAD_REQUIRED_FIELDS: &[&str] = &[
    "id",
    "customerName",
    "phone",
    "address",
    "status",
    "services",
    "assignedTo",
    "createdAt",
    "updatedAt",
];
pub const CUSTOMER_REQUIRED_FIELDS: &[&str] = &["id", "name", "phone", "createdAt", "updatedAt"];
pub const KYC_DOCUMENT_REQUIRED_FIELDS: &[&str] = &["id", "customerId", "documentType", "status"];
pub const QUOTATION_REQUIRED_FIELDS: &[&str] =
    &["id", "leadId", "customerName", "totalAmount", "status", "createdAt"];
