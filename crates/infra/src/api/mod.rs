//! Remote API client for the field-sales backend
//!
//! Reads the paginated collections (leads, customers, quotations) and the
//! per-customer KYC documents.
//!
//! # Architecture
//!
//! - Uses [`crate::http::HttpClient`] (no direct reqwest calls)
//! - Bearer token from an injected [`AccessTokenProvider`]
//! - Transport failures are retried by the client's retry policy; HTTP error
//!   statuses are mapped to [`ApiError`] without retry

pub mod auth;
pub mod client;
pub mod errors;
pub mod types;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::{ApiClient, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
