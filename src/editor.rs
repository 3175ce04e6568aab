//! Values handed to the edit form when it is rendered.

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    auth::User,
    configuration::DraftSettings,
    draft::{Draft, DraftId},
    store::{DraftStore, StoreError},
};

const DRAFT_TOKEN_LENGTH: usize = 32;

/// Save-control label for each agent status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub unchanged: String,
    pub changed: String,
    pub saving: String,
    pub saved: String,
    pub error: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            unchanged: "Save draft".to_string(),
            changed: "Save draft".to_string(),
            saving: "Saving...".to_string(),
            saved: "Saved".to_string(),
            error: "Error".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub auto_save_wait: Option<u64>,
    pub auto_save_timeout: u64,
    pub auto_save_input_based: bool,
    pub messages: Labels,
    /// Correlation token for this edit session.
    pub draft_token: String,
    /// Draft to resume, when the editor was opened on one.
    pub draft: Option<Draft>,
    /// How many drafts the user already has for the title being edited.
    pub draft_count: i64,
}

pub fn generate_draft_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DRAFT_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Builds the handoff for `user` opening an editor on `title`, optionally
/// resuming the draft `resume`. Drafts owned by someone else are ignored.
pub async fn editor_config(
    store: &dyn DraftStore,
    settings: &DraftSettings,
    user: &User,
    title: &str,
    resume: Option<DraftId>,
) -> Result<EditorConfig, StoreError> {
    let draft = match resume {
        Some(id) => store.get(id).await?.filter(|draft| {
            let owned = draft.owner == user.id;
            if !owned {
                tracing::warn!(draft_id = %id, ?user, "ignoring request to resume foreign draft");
            }
            owned
        }),
        None => None,
    };

    let draft_token = draft
        .as_ref()
        .map(|draft| draft.token.clone())
        .unwrap_or_else(generate_draft_token);

    let draft_count = store.count_for_owner(user.id, title).await?;

    Ok(EditorConfig {
        auto_save_wait: settings.auto_save_wait,
        auto_save_timeout: settings.auto_save_timeout,
        auto_save_input_based: settings.auto_save_input_based,
        messages: settings.messages.clone(),
        draft_token,
        draft,
        draft_count,
    })
}
