use std::sync::Arc;

use serde_json::json;

use crate::database::client::{from_row, from_rows, optional_from_row};
use crate::database::models::{NewPost, Post, PostListing};
use crate::database::{DatabaseError, StoreClient};

pub struct PostService {
    store: Arc<StoreClient>,
}

impl PostService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn get_post_listings(&self) -> Result<Vec<PostListing>, DatabaseError> {
        let rows = self
            .store
            .find_many(
                "Post",
                json!({ "select": { "slug": true, "title": true }, "orderBy": { "slug": "asc" } }),
            )
            .await?;
        from_rows(rows)
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        let rows = self
            .store
            .find_many("Post", json!({ "orderBy": { "slug": "asc" } }))
            .await?;
        from_rows(rows)
    }

    pub async fn get_post(&self, slug: &str) -> Result<Option<Post>, DatabaseError> {
        let row = self
            .store
            .find_unique("Post", json!({ "where": { "slug": slug } }))
            .await?;
        optional_from_row(row)
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, DatabaseError> {
        let row = self.store.create("Post", json!({ "data": post })).await?;
        from_row(row)
    }

    /// The slug itself may change; `slug` names the post being edited
    pub async fn update_post(&self, slug: &str, post: &NewPost) -> Result<Post, DatabaseError> {
        let row = self
            .store
            .update("Post", json!({ "where": { "slug": slug }, "data": post }))
            .await?;
        from_row(row)
    }

    pub async fn delete_post(&self, slug: &str) -> Result<Post, DatabaseError> {
        let row = self
            .store
            .delete("Post", json!({ "where": { "slug": slug } }))
            .await?;
        from_row(row)
    }
}
