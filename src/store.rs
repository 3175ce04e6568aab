mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::draft::{Draft, DraftFields, DraftId, NewDraft};

pub use sqlite::SqliteDraftStore;

#[cfg(test)]
pub(crate) use sqlite::tests::{fields as test_fields, memory_store};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("draft {0} does not exist")]
    NotFound(DraftId),
    #[error("draft {id} is not owned by {requester}")]
    Unauthorized { id: DraftId, requester: Uuid },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence for drafts.
///
/// Every operation is atomic with respect to a single draft record. The store
/// enforces identity and, for `discard`, ownership; everything else is the
/// caller's business.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persists a new draft and returns its freshly assigned identity.
    async fn create(&self, draft: NewDraft) -> Result<DraftId, StoreError>;

    /// Overwrites the mutable fields of an existing draft. Identity, owner and
    /// correlation token never change.
    async fn update(&self, id: DraftId, fields: DraftFields) -> Result<(), StoreError>;

    async fn get(&self, id: DraftId) -> Result<Option<Draft>, StoreError>;

    /// All drafts for `title`, most recently saved first.
    async fn list_for_title(&self, title: &str) -> Result<Vec<Draft>, StoreError>;

    /// The drafts of one user, optionally restricted to a title, most recently
    /// saved first.
    async fn list_for_owner(
        &self,
        owner: Uuid,
        title: Option<&str>,
    ) -> Result<Vec<Draft>, StoreError>;

    async fn count_for_title(&self, title: &str) -> Result<i64, StoreError>;

    async fn count_for_owner(&self, owner: Uuid, title: &str) -> Result<i64, StoreError>;

    /// Removes a draft. Only its owner may do so.
    async fn discard(&self, id: DraftId, requester: Uuid) -> Result<(), StoreError>;

    /// Re-points every draft of `old_title` at `new_title`, returning how many
    /// moved.
    async fn retitle_all(&self, old_title: &str, new_title: &str) -> Result<u64, StoreError>;

    /// Deletes drafts last saved before `cutoff`, returning how many went.
    async fn purge_saved_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
