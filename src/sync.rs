use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::{
    auth::User,
    draft::{DraftFields, NewDraft},
    protocol::{SaveOutcome, SaveRequest},
    store::{DraftStore, StoreError},
};

/// Server side of the save protocol: authenticates the call and turns it into
/// a create or an ownership-checked update.
#[derive(Clone)]
pub struct DraftSyncService {
    store: Arc<dyn DraftStore>,
}

impl DraftSyncService {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self { store }
    }

    #[instrument(
        name = "save draft",
        skip(self, user, request),
        fields(user = %user.id, draft_id = ?request.id, title = %request.title)
    )]
    pub async fn save(&self, user: &User, request: SaveRequest) -> Result<SaveOutcome, StoreError> {
        if request.auth_token.expose_secret() != user.edit_token.expose_secret() {
            tracing::warn!("authenticity token mismatch, draft not saved");
            return Ok(SaveOutcome::AuthFailure);
        }

        let fields = DraftFields {
            title: request.title,
            section: request.section,
            start_time: request.start_time,
            edit_time: request.edit_time,
            save_time: Utc::now(),
            scroll_top: request.scroll_top,
            text: request.text,
            summary: request.summary,
            minor_edit: request.minor_edit,
        };

        let Some(id) = request.id else {
            let id = self
                .store
                .create(NewDraft {
                    owner: user.id,
                    token: request.correlation_token,
                    fields,
                })
                .await?;
            tracing::info!(draft_id = %id, "created draft");
            return Ok(SaveOutcome::Success { id });
        };

        match self.store.get(id).await? {
            Some(existing) if existing.owner != user.id => {
                tracing::error!(owner = %existing.owner, "user does not own draft");
                Ok(SaveOutcome::Unauthorized)
            }
            Some(_) => match self.store.update(id, fields.clone()).await {
                Ok(()) => {
                    tracing::debug!("updated draft");
                    Ok(SaveOutcome::Success { id })
                }
                // Discarded between the lookup and the write.
                Err(StoreError::NotFound(_)) => {
                    self.recreate(user, request.correlation_token, fields).await
                }
                Err(e) => Err(e),
            },
            None => self.recreate(user, request.correlation_token, fields).await,
        }
    }

    async fn recreate(
        &self,
        user: &User,
        token: String,
        fields: DraftFields,
    ) -> Result<SaveOutcome, StoreError> {
        let id = self
            .store
            .create(NewDraft {
                owner: user.id,
                token,
                fields,
            })
            .await?;
        tracing::warn!(new_draft_id = %id, "draft to update no longer exists, saved as new draft");
        Ok(SaveOutcome::Success { id })
    }
}
