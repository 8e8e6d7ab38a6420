//! Item store boundary used by the destruction coordinator

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::db::models::{Gadget, GadgetStatus, StatusTimestamp};

/// Infrastructure failure while talking to the item store
#[derive(Debug, thiserror::Error)]
#[error("Item store unavailable: {0}")]
pub struct ItemStoreError(pub String);

/// Lookup and status-update access to gadgets.
///
/// `Ok(None)` means the gadget does not exist. The store applies the
/// transition it is given; deciding whether it is legal is the caller's job.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Gadget>, ItemStoreError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: GadgetStatus,
        timestamp: StatusTimestamp,
        at: DateTime<Utc>,
    ) -> Result<Option<Gadget>, ItemStoreError>;
}
