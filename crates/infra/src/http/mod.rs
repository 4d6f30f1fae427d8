//! HTTP transport

pub mod client;
pub mod retry;

pub use client::{HttpClient, HttpClientBuilder};
pub use retry::RetryPolicy;
