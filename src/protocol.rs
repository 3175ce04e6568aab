//! Wire format of the `save` call.
//!
//! The request travels as an urlencoded form with the field names the edit
//! form has always used. The response body is the draft identity as text, or
//! `-1` when the caller's authenticity token did not match.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::draft::DraftId;

pub const AUTH_FAILURE_SENTINEL: &str = "-1";

/// Raw form fields of a save call, exactly as they appear on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveParams {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub drafttoken: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub starttime: String,
    #[serde(default)]
    pub edittime: String,
    #[serde(default)]
    pub scrolltop: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minoredit: Option<String>,
}

/// A typed save call.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub auth_token: Secret<String>,
    pub correlation_token: String,
    pub id: Option<DraftId>,
    pub title: String,
    pub section: Option<String>,
    pub start_time: String,
    pub edit_time: String,
    pub scroll_top: i64,
    pub text: String,
    pub summary: String,
    pub minor_edit: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid draft id {0:?}")]
    InvalidId(String),
    #[error("a title is required")]
    MissingTitle,
}

impl TryFrom<SaveParams> for SaveRequest {
    type Error = ProtocolError;

    fn try_from(params: SaveParams) -> Result<Self, Self::Error> {
        let id = match params.id.as_deref() {
            Some(raw) => {
                DraftId::from_form(raw).map_err(|_| ProtocolError::InvalidId(raw.to_string()))?
            }
            None => None,
        };
        if params.title.trim().is_empty() {
            return Err(ProtocolError::MissingTitle);
        }

        Ok(Self {
            auth_token: Secret::new(params.token),
            correlation_token: params.drafttoken,
            id,
            title: params.title,
            section: params.section.filter(|section| !section.is_empty()),
            start_time: params.starttime,
            edit_time: params.edittime,
            scroll_top: params
                .scrolltop
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or_default(),
            text: params.text,
            summary: params.summary,
            minor_edit: params
                .minoredit
                .is_some_and(|value| !value.is_empty() && value != "0"),
        })
    }
}

impl From<&SaveRequest> for SaveParams {
    fn from(request: &SaveRequest) -> Self {
        Self {
            token: request.auth_token.expose_secret().clone(),
            drafttoken: request.correlation_token.clone(),
            id: Some(request.id.map(|id| id.to_string()).unwrap_or_default()),
            title: request.title.clone(),
            section: Some(request.section.clone().unwrap_or_default()),
            starttime: request.start_time.clone(),
            edittime: request.edit_time.clone(),
            scrolltop: Some(request.scroll_top.to_string()),
            text: request.text.clone(),
            summary: request.summary.clone(),
            minoredit: request.minor_edit.then(|| "1".to_string()),
        }
    }
}

/// Result of one save call, as observed by either end.
///
/// The server only ever produces the first three variants; `TransportError`
/// is what the client sees when no usable answer came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Success { id: DraftId },
    AuthFailure,
    Unauthorized,
    TransportError(String),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Decodes a response from its HTTP status code and body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let body = body.trim();
        match status {
            200..=299 if body == AUTH_FAILURE_SENTINEL => Self::AuthFailure,
            200..=299 => match body.parse::<i64>() {
                Ok(id) if id > 0 => Self::Success { id: DraftId(id) },
                _ => Self::TransportError(format!("unexpected response body {body:?}")),
            },
            401 => Self::AuthFailure,
            403 => Self::Unauthorized,
            status => Self::TransportError(format!("unexpected status {status}")),
        }
    }
}
