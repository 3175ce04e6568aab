use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned draft identity. Always positive once persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct DraftId(pub i64);

impl DraftId {
    /// Reads an identity the way the edit form carries it: blank, `0` or
    /// negative all mean "not yet persisted".
    pub fn from_form(value: &str) -> Result<Option<Self>, std::num::ParseIntError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let id = value.parse::<i64>()?;
        Ok((id > 0).then_some(Self(id)))
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted snapshot of in-progress edit content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Draft {
    pub id: DraftId,
    pub owner: Uuid,
    pub token: String,
    pub title: String,
    pub section: Option<String>,
    pub start_time: String,
    pub edit_time: String,
    pub save_time: DateTime<Utc>,
    pub scroll_top: i64,
    pub text: String,
    pub summary: String,
    pub minor_edit: bool,
}

/// The mutable part of a draft, written on every save.
///
/// `start_time` and `edit_time` are carried through exactly as the edit form
/// supplied them. `save_time` is always stamped by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftFields {
    pub title: String,
    pub section: Option<String>,
    pub start_time: String,
    pub edit_time: String,
    pub save_time: DateTime<Utc>,
    pub scroll_top: i64,
    pub text: String,
    pub summary: String,
    pub minor_edit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDraft {
    pub owner: Uuid,
    pub token: String,
    pub fields: DraftFields,
}
