//! Wire envelopes of the remote API

use fieldsync_domain::RawRecord;
use serde::Deserialize;

/// Outer response envelope: `{success, data, message}`.
///
/// `success` is optional because some endpoints omit it; only an explicit
/// `false` marks a failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` of a paginated collection
#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub items: Vec<RawRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    /// Echoed page size; absent means the requested one
    #[serde(default)]
    pub limit: Option<u64>,
}

/// `data` of the per-customer documents endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsData {
    #[serde(default)]
    pub documents: Vec<RawRecord>,
}
