//! Entity-scoped sync failures

use fieldsync_domain::{EntityType, FieldSyncError};
use thiserror::Error;

/// Failure of one entity's fetch or commit step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitySyncError {
    /// A page could not be fetched; `total_pages` is unknown when page 1 failed
    #[error("failed to fetch {entity} page {page}: {source}")]
    PageFetch {
        entity: EntityType,
        page: u32,
        total_pages: Option<u32>,
        source: FieldSyncError,
    },

    /// The entity batch could not be committed
    #[error("failed to persist {entity}: {source}")]
    Persist { entity: EntityType, source: FieldSyncError },
}

impl EntitySyncError {
    pub fn entity(&self) -> EntityType {
        match self {
            Self::PageFetch { entity, .. } | Self::Persist { entity, .. } => *entity,
        }
    }

    /// The underlying error
    pub fn cause(&self) -> &FieldSyncError {
        match self {
            Self::PageFetch { source, .. } | Self::Persist { source, .. } => source,
        }
    }

    /// True when the remote collection does not exist at all
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::PageFetch { page: 1, source: FieldSyncError::NotFound(_), .. }
        )
    }
}
