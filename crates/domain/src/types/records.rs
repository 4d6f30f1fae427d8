//! Storage-ready records produced by validation
//!
//! Every record carries a [`SyncStatus`] tag and an opaque `local_changes`
//! slot. The engine only pulls, so records leave validation as
//! [`SyncStatus::Synced`] with no local changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FieldSyncError;

/// Untyped record as received from the remote API.
pub type RawRecord = serde_json::Value;

/// Local sync state of a cached record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Matches the last pulled remote state
    #[default]
    Synced,
    /// Carries local edits awaiting upload
    Pending,
}

impl SyncStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = FieldSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synced" => Ok(Self::Synced),
            "pending" => Ok(Self::Pending),
            other => Err(FieldSyncError::InvalidInput(format!("unknown sync status: {other}"))),
        }
    }
}

/// Aggregate verification state of a customer, derived from its documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// No documents uploaded
    #[default]
    Pending,
    /// Documents present but not uniformly approved
    Submitted,
    Approved,
    Rejected,
}

impl KycStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = FieldSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(FieldSyncError::InvalidInput(format!("unknown KYC status: {other}"))),
        }
    }
}

/// Sales lead assigned to a field agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub status: String,
    pub services: Vec<String>,
    pub assigned_to: String,
    /// Not part of the wire format; defaults to `"medium"`
    pub priority: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub sync_status: SyncStatus,
    pub local_changes: Option<serde_json::Value>,
}

/// Customer converted from a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub lead_id: Option<String>,
    pub kyc_status: KycStatus,
    pub created_at: String,
    pub updated_at: String,
    pub sync_status: SyncStatus,
    pub local_changes: Option<serde_json::Value>,
}

/// Identity or address proof uploaded for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycDocument {
    pub id: String,
    pub customer_id: String,
    pub document_type: String,
    /// Remote review status (`Approved`, `Rejected`, `Pending`, ...)
    pub status: String,
    pub file_url: Option<String>,
    pub uploaded_at: Option<String>,
    pub remarks: Option<String>,
    pub sync_status: SyncStatus,
    pub local_changes: Option<serde_json::Value>,
}

/// Price quotation issued against a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: String,
    pub lead_id: String,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: String,
    pub valid_until: Option<String>,
    /// Line items, kept verbatim
    pub items: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub sync_status: SyncStatus,
    pub local_changes: Option<serde_json::Value>,
}

/// A customer together with the documents fetched for it.
///
/// Customers and their documents commit in the same transaction, customers
/// first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerBundle {
    pub customer: Customer,
    pub documents: Vec<KycDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_round_trip_through_strings() {
        for status in
            [KycStatus::Pending, KycStatus::Submitted, KycStatus::Approved, KycStatus::Rejected]
        {
            assert_eq!(status.as_str().parse::<KycStatus>().unwrap(), status);
        }
        assert_eq!("synced".parse::<SyncStatus>().unwrap(), SyncStatus::Synced);
        assert!("dirty".parse::<SyncStatus>().is_err());
    }
}
