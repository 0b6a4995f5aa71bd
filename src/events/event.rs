use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::QueryParams;

/// Event name published after a successful `Note.create`
pub const NOTE_CREATED: &str = "note.created";

/// Published after a watched creation succeeds. Lives only for the
/// duration of the publishing call; nothing persists or retries it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationEvent {
    pub entity_name: String,
    pub operation_name: String,
    /// The operation descriptor exactly as the caller issued it
    pub payload: QueryParams,
    pub occurred_at: DateTime<Utc>,
}

impl CreationEvent {
    pub fn from_params(params: QueryParams) -> Self {
        Self {
            entity_name: params.model.clone(),
            operation_name: params.action.to_string(),
            payload: params,
            occurred_at: Utc::now(),
        }
    }
}
