use std::sync::Arc;

use serde_json::json;

use crate::auth::{hash_password, verify_password};
use crate::database::client::{from_row, optional_from_row};
use crate::database::models::User;
use crate::database::{DatabaseError, StoreClient};

pub struct UserService {
    store: Arc<StoreClient>,
}

impl UserService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let row = self
            .store
            .find_unique("User", json!({ "where": { "id": id } }))
            .await?;
        optional_from_row(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = self
            .store
            .find_unique("User", json!({ "where": { "email": email } }))
            .await?;
        optional_from_row(row)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> Result<User, DatabaseError> {
        let password_hash = hash_password(password)
            .map_err(|e| DatabaseError::invalid_value("User", "passwordHash", e.to_string()))?;
        let row = self
            .store
            .create(
                "User",
                json!({ "data": { "email": email, "passwordHash": password_hash } }),
            )
            .await?;
        from_row(row)
    }

    /// `None` for an unknown email or a wrong password
    pub async fn verify_login(&self, email: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let user = self.get_user_by_email(email).await?;
        Ok(user.filter(|u| verify_password(password, &u.password_hash)))
    }

    /// Also removes the user's notes
    pub async fn delete_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let row = self
            .store
            .delete("User", json!({ "where": { "email": email } }))
            .await?;
        from_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryEngine;
    use crate::services::NoteService;

    #[tokio::test]
    async fn login_checks_the_password() {
        let users = UserService::new(Arc::new(StoreClient::new(Arc::new(MemoryEngine::new()))));
        let user = users.create_user("rachel@remix.run", "racheliscool").await.unwrap();
        assert!(user.password_hash.starts_with("$argon2id$"));

        let found = users.verify_login("rachel@remix.run", "racheliscool").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id.clone()));
        assert!(users.verify_login("rachel@remix.run", "wrong").await.unwrap().is_none());
        assert!(users.verify_login("nobody@remix.run", "racheliscool").await.unwrap().is_none());
        assert_eq!(users.get_user_by_id(&user.id).await.unwrap().unwrap().email, "rachel@remix.run");
    }

    #[tokio::test]
    async fn emails_are_unique() {
        let users = UserService::new(Arc::new(StoreClient::new(Arc::new(MemoryEngine::new()))));
        users.create_user("a@b.c", "password1").await.unwrap();
        let err = users.create_user("a@b.c", "password2").await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_notes() {
        let store = Arc::new(StoreClient::new(Arc::new(MemoryEngine::new())));
        let users = UserService::new(store.clone());
        let notes = NoteService::new(store);

        let user = users.create_user("a@b.c", "password1").await.unwrap();
        notes.create_note("T", "B", &user.id).await.unwrap();

        users.delete_user_by_email("a@b.c").await.unwrap();
        assert!(notes.get_note_list_items(&user.id).await.unwrap().is_empty());
        assert!(users.get_user_by_email("a@b.c").await.unwrap().is_none());
    }
}
