// handlers/protected/notes.rs - the signed-in user's notes
//
// GET/POST /notes, GET/DELETE /notes/:id. Another user's note reads as 404.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::models::{Note, NoteDetail, NoteListItem};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NoteIndex {
    pub notes: Vec<NoteListItem>,
}

#[derive(Debug, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

pub async fn notes_index(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<NoteIndex> {
    let notes = state.notes().get_note_list_items(&user.id).await?;
    Ok(ApiResponse::success(NoteIndex { notes }))
}

pub async fn note_create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<NewNote>,
) -> ApiResult<Note> {
    let mut field_errors = HashMap::new();
    if input.title.trim().is_empty() {
        field_errors.insert("title".to_string(), "Title is required".to_string());
    }
    if input.body.trim().is_empty() {
        field_errors.insert("body".to_string(), "Body is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::unprocessable_entity("Note is invalid", field_errors));
    }

    let note = state.notes().create_note(&input.title, &input.body, &user.id).await?;
    Ok(ApiResponse::created(note))
}

pub async fn note_show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<NoteDetail> {
    state
        .notes()
        .get_note(&id, &user.id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Note not found"))
}

pub async fn note_delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    match state.notes().delete_note(&id, &user.id).await? {
        0 => Err(ApiError::not_found("Note not found")),
        count => Ok(ApiResponse::success(json!({ "id": id, "deleted": count }))),
    }
}
