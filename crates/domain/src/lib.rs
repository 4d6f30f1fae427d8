//! # FieldSync Domain
//!
//! Business domain types and models for the FieldSync engine.
//!
//! This crate contains:
//! - Remote collection records (leads, customers, KYC documents, quotations)
//! - Sync run types (results, progress events, metadata, failure reasons)
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other FieldSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
