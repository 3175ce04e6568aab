use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{Host, User},
    draft::{Draft, DraftId},
    editor::{editor_config, EditorConfig},
    error::ApiError,
    hooks::EditLifecycleObserver,
    protocol::{SaveOutcome, SaveParams, SaveRequest, AUTH_FAILURE_SENTINEL},
    startup::ApplicationState,
};

pub async fn save_draft(
    State(state): State<Arc<ApplicationState>>,
    Extension(user): Extension<User>,
    Form(params): Form<SaveParams>,
) -> Result<Response, ApiError> {
    // A stale session gets the sentinel no matter what else the form carries.
    if params.token != *user.edit_token.expose_secret() {
        tracing::warn!(user = %user.id, "authenticity token mismatch, draft not saved");
        return Ok((StatusCode::OK, AUTH_FAILURE_SENTINEL).into_response());
    }

    let request = SaveRequest::try_from(params)?;

    let response = match state.sync.save(&user, request).await? {
        SaveOutcome::Success { id } => (StatusCode::OK, id.to_string()).into_response(),
        SaveOutcome::AuthFailure => (StatusCode::OK, AUTH_FAILURE_SENTINEL).into_response(),
        SaveOutcome::Unauthorized => {
            (StatusCode::FORBIDDEN, AUTH_FAILURE_SENTINEL).into_response()
        }
        SaveOutcome::TransportError(reason) => {
            tracing::error!(%reason, "sync service produced a transport error");
            return Err(ApiError::UnexpectedError);
        }
    };
    Ok(response)
}

#[derive(Deserialize)]
pub struct ListParams {
    pub title: Option<String>,
}

pub async fn list_drafts(
    State(state): State<Arc<ApplicationState>>,
    Extension(user): Extension<User>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Draft>>, ApiError> {
    let drafts = state
        .store
        .list_for_owner(user.id, params.title.as_deref())
        .await?;
    Ok(Json(drafts))
}

#[derive(Deserialize)]
pub struct CountParams {
    pub title: String,
}

#[derive(Serialize, Deserialize)]
pub struct DraftCount {
    pub title: String,
    pub count: i64,
}

pub async fn count_drafts(
    State(state): State<Arc<ApplicationState>>,
    Extension(user): Extension<User>,
    Query(params): Query<CountParams>,
) -> Result<Json<DraftCount>, ApiError> {
    let count = state.store.count_for_owner(user.id, &params.title).await?;
    Ok(Json(DraftCount {
        title: params.title,
        count,
    }))
}

pub async fn get_draft(
    State(state): State<Arc<ApplicationState>>,
    Extension(user): Extension<User>,
    Path(id): Path<DraftId>,
) -> Result<Json<Draft>, ApiError> {
    let draft = state
        .store
        .get(id)
        .await?
        .ok_or(ApiError::DraftNotFoundError(id))?;

    if draft.owner != user.id {
        tracing::error!(?user, draft = %id, "user does not have access to draft");
        return Err(ApiError::DraftNotFoundError(id));
    }

    Ok(Json(draft))
}

pub async fn discard_draft(
    State(state): State<Arc<ApplicationState>>,
    Extension(user): Extension<User>,
    Path(id): Path<DraftId>,
) -> Result<StatusCode, ApiError> {
    state.store.discard(id, user.id).await?;
    tracing::info!(draft = %id, "draft discarded by owner");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct EditorParams {
    pub title: String,
    pub draft: Option<String>,
}

pub async fn editor(
    State(state): State<Arc<ApplicationState>>,
    Extension(user): Extension<User>,
    Query(params): Query<EditorParams>,
) -> Result<Json<EditorConfig>, ApiError> {
    let resume = match params.draft.as_deref() {
        Some(raw) => DraftId::from_form(raw)
            .map_err(|_| ApiError::BadRequest(format!("invalid draft id {:?}", raw)))?,
        None => None,
    };

    let config = editor_config(
        state.store.as_ref(),
        &state.drafts,
        &user,
        &params.title,
        resume,
    )
    .await?;
    Ok(Json(config))
}

#[derive(Serialize, Deserialize)]
pub struct DocumentRenamed {
    pub old_title: String,
    pub new_title: String,
}

#[derive(Serialize, Deserialize)]
pub struct Retitled {
    pub moved: u64,
}

pub async fn document_renamed(
    State(state): State<Arc<ApplicationState>>,
    Extension(host): Extension<Host>,
    Json(event): Json<DocumentRenamed>,
) -> Result<Json<Retitled>, ApiError> {
    if event.new_title.trim().is_empty() {
        return Err(ApiError::BadRequest("new title must not be empty".to_string()));
    }
    tracing::debug!(service = %host.service, "document renamed");
    let moved = state
        .hooks
        .on_document_renamed(&event.old_title, &event.new_title)
        .await?;
    Ok(Json(Retitled { moved }))
}

#[derive(Serialize, Deserialize)]
pub struct PublishSucceeded {
    pub draft_id: DraftId,
    /// The editor whose publish started from the draft.
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct Discarded {
    pub discarded: bool,
}

pub async fn publish_succeeded(
    State(state): State<Arc<ApplicationState>>,
    Extension(host): Extension<Host>,
    Json(event): Json<PublishSucceeded>,
) -> Result<Json<Discarded>, ApiError> {
    tracing::debug!(service = %host.service, draft_id = %event.draft_id, "publish succeeded");
    let discarded = state
        .hooks
        .on_publish_succeeded(event.draft_id, event.user_id)
        .await?;
    Ok(Json(Discarded { discarded }))
}
