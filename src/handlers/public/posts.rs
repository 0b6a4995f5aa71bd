// handlers/public/posts.rs - GET /posts, GET /posts/:slug

use axum::extract::{Path, State};
use serde::Serialize;

use crate::database::models::{Post, PostListing};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, MaybeUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PostIndex {
    pub posts: Vec<PostListing>,
    /// Lets clients show the admin link
    pub is_admin: bool,
}

pub async fn posts_index(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> ApiResult<PostIndex> {
    let posts = state.posts().get_post_listings().await?;
    let is_admin = user.as_ref().is_some_and(|u| state.is_admin(u));
    Ok(ApiResponse::success(PostIndex { posts, is_admin }))
}

pub async fn post_show(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Post> {
    state
        .posts()
        .get_post(&slug)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| post_not_found(&slug))
}

pub fn post_not_found(slug: &str) -> ApiError {
    ApiError::not_found(format!("Uh oh! The post with the slug \"{}\" does not exist!", slug))
}
