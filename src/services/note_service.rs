use std::sync::Arc;

use serde_json::json;

use crate::database::client::{from_row, from_rows, optional_from_row};
use crate::database::models::{Note, NoteDetail, NoteListItem};
use crate::database::{DatabaseError, StoreClient};

/// Notes are always scoped to their owner
pub struct NoteService {
    store: Arc<StoreClient>,
}

impl NoteService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn get_note(&self, id: &str, user_id: &str) -> Result<Option<NoteDetail>, DatabaseError> {
        let row = self
            .store
            .find_first(
                "Note",
                json!({
                    "select": { "id": true, "body": true, "title": true },
                    "where": { "id": id, "userId": user_id }
                }),
            )
            .await?;
        optional_from_row(row)
    }

    /// Most recently updated first
    pub async fn get_note_list_items(&self, user_id: &str) -> Result<Vec<NoteListItem>, DatabaseError> {
        let rows = self
            .store
            .find_many(
                "Note",
                json!({
                    "where": { "userId": user_id },
                    "select": { "id": true, "title": true },
                    "orderBy": { "updatedAt": "desc" }
                }),
            )
            .await?;
        from_rows(rows)
    }

    pub async fn create_note(&self, title: &str, body: &str, user_id: &str) -> Result<Note, DatabaseError> {
        let row = self
            .store
            .create(
                "Note",
                json!({ "data": { "title": title, "body": body, "userId": user_id } }),
            )
            .await?;
        from_row(row)
    }

    /// Returns how many notes were removed (0 when the note is missing or not owned)
    pub async fn delete_note(&self, id: &str, user_id: &str) -> Result<u64, DatabaseError> {
        self.store
            .delete_many("Note", json!({ "where": { "id": id, "userId": user_id } }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryEngine;

    async fn seeded() -> (NoteService, String) {
        let store = Arc::new(StoreClient::new(Arc::new(MemoryEngine::new())));
        let user = store
            .create(
                "User",
                json!({ "data": { "email": "owner@quill.test", "passwordHash": "x" } }),
            )
            .await
            .unwrap();
        let user_id = user["id"].as_str().unwrap().to_string();
        (NoteService::new(store), user_id)
    }

    #[tokio::test]
    async fn notes_are_read_back_by_owner_only() {
        let (notes, owner) = seeded().await;
        let note = notes.create_note("T", "body", &owner).await.unwrap();

        let detail = notes.get_note(&note.id, &owner).await.unwrap().unwrap();
        assert_eq!(
            detail,
            NoteDetail { id: note.id.clone(), title: "T".into(), body: "body".into() }
        );
        assert!(notes.get_note(&note.id, "someone-else").await.unwrap().is_none());

        let items = notes.get_note_list_items(&owner).await.unwrap();
        assert_eq!(items, vec![NoteListItem { id: note.id.clone(), title: "T".into() }]);
    }

    #[tokio::test]
    async fn delete_reports_zero_for_foreign_notes() {
        let (notes, owner) = seeded().await;
        let note = notes.create_note("T", "body", &owner).await.unwrap();

        assert_eq!(notes.delete_note(&note.id, "someone-else").await.unwrap(), 0);
        assert_eq!(notes.delete_note(&note.id, &owner).await.unwrap(), 1);
        assert!(notes.get_note_list_items(&owner).await.unwrap().is_empty());
    }
}
