use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    draft::DraftId,
    store::{DraftStore, StoreError},
};

/// Lifecycle events of the host wiki that drafts have to follow. The host
/// calls these; drafts never reach into the host.
#[async_trait]
pub trait EditLifecycleObserver: Send + Sync {
    /// A document was renamed; its drafts move with it.
    async fn on_document_renamed(&self, old_title: &str, new_title: &str)
        -> Result<u64, StoreError>;

    /// An edit that started from `draft_id` was published by `user`. Returns
    /// whether a draft was discarded.
    async fn on_publish_succeeded(&self, draft_id: DraftId, user: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct DraftHooks {
    store: Arc<dyn DraftStore>,
}

impl DraftHooks {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EditLifecycleObserver for DraftHooks {
    async fn on_document_renamed(
        &self,
        old_title: &str,
        new_title: &str,
    ) -> Result<u64, StoreError> {
        let moved = self.store.retitle_all(old_title, new_title).await?;
        tracing::info!(%old_title, %new_title, moved, "moved drafts to renamed document");
        Ok(moved)
    }

    async fn on_publish_succeeded(&self, draft_id: DraftId, user: Uuid) -> Result<bool, StoreError> {
        match self.store.discard(draft_id, user).await {
            Ok(()) => {
                tracing::info!(%draft_id, %user, "discarded draft after publish");
                Ok(true)
            }
            // Already discarded or purged; nothing to reconcile.
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
