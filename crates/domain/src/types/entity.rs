//! Remote collection identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FieldSyncError;

/// Collections reconciled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Leads,
    Customers,
    KycDocuments,
    Quotations,
}

impl EntityType {
    /// Every entity, in sync order.
    pub const ALL: [EntityType; 4] =
        [Self::Leads, Self::Customers, Self::KycDocuments, Self::Quotations];

    /// Stable key used for metadata rows and log fields.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Customers => "customers",
            Self::KycDocuments => "kyc_documents",
            Self::Quotations => "quotations",
        }
    }

    /// Path of the remote resource, relative to the API base URL.
    pub const fn resource_path(&self) -> &'static str {
        match self {
            Self::Leads => "/leads",
            Self::Customers => "/customers",
            Self::KycDocuments => "/kycDocuments",
            Self::Quotations => "/quotations",
        }
    }

    /// The primary entity aborts the whole run when it fails.
    pub const fn is_primary(&self) -> bool {
        matches!(self, Self::Leads)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = FieldSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leads" => Ok(Self::Leads),
            "customers" => Ok(Self::Customers),
            "kyc_documents" => Ok(Self::KycDocuments),
            "quotations" => Ok(Self::Quotations),
            other => Err(FieldSyncError::InvalidInput(format!("unknown entity type: {other}"))),
        }
    }
}
