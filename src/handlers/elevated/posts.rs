// handlers/elevated/posts.rs - GET /posts/admin, GET/POST /posts/admin/:slug
//
// `:slug` is `new` when creating. The form's `intent` picks delete; anything
// else validates and then creates or updates. Success redirects (303) back to
// /posts/admin.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Form,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::models::{NewPost, Post, PostListing};
use crate::error::ApiError;
use crate::handlers::public::posts::post_not_found;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::state::AppState;

pub const NEW_POST_SLUG: &str = "new";
pub const ADMIN_INDEX: &str = "/posts/admin";

#[derive(Debug, Serialize)]
pub struct AdminIndex {
    pub posts: Vec<PostListing>,
}

#[derive(Debug, Serialize)]
pub struct AdminPost {
    pub post: Option<Post>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    pub intent: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub markdown: Option<String>,
}

impl PostForm {
    /// Each missing or empty field yields "<Field> is required"
    pub fn validate(self) -> Result<NewPost, HashMap<String, String>> {
        let mut errors = HashMap::new();
        let mut required = |field: &str, label: &str, value: Option<String>| match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                errors.insert(field.to_string(), format!("{} is required", label));
                String::new()
            }
        };

        let post = NewPost {
            title: required("title", "Title", self.title),
            slug: required("slug", "Slug", self.slug),
            markdown: required("markdown", "Markdown", self.markdown),
        };

        if errors.is_empty() {
            Ok(post)
        } else {
            Err(errors)
        }
    }
}

pub async fn admin_index(AdminUser(_): AdminUser, State(state): State<AppState>) -> ApiResult<AdminIndex> {
    let posts = state.posts().get_post_listings().await?;
    Ok(ApiResponse::success(AdminIndex { posts }))
}

pub async fn admin_show(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<AdminPost> {
    if slug == NEW_POST_SLUG {
        return Ok(ApiResponse::success(AdminPost { post: None }));
    }

    let post = state
        .posts()
        .get_post(&slug)
        .await?
        .ok_or_else(|| post_not_found(&slug))?;
    Ok(ApiResponse::success(AdminPost { post: Some(post) }))
}

pub async fn admin_action(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, ApiError> {
    let posts = state.posts();

    if form.intent.as_deref() == Some("delete") {
        posts.delete_post(&slug).await?;
        info!("{} deleted post '{}'", admin.email, slug);
        return Ok(Redirect::to(ADMIN_INDEX));
    }

    let post = form
        .validate()
        .map_err(|field_errors| ApiError::unprocessable_entity("Post is invalid", field_errors))?;

    if slug == NEW_POST_SLUG {
        posts.create_post(&post).await?;
        info!("{} created post '{}'", admin.email, post.slug);
    } else {
        posts.update_post(&slug, &post).await?;
        info!("{} updated post '{}'", admin.email, slug);
    }

    Ok(Redirect::to(ADMIN_INDEX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_missing_field() {
        let errors = PostForm {
            title: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors["title"], "Title is required");
        assert_eq!(errors["slug"], "Slug is required");
        assert_eq!(errors["markdown"], "Markdown is required");
    }

    #[test]
    fn complete_forms_become_posts() {
        let post = PostForm {
            intent: Some("create".into()),
            title: Some("Hello".into()),
            slug: Some("hello".into()),
            markdown: Some("# Hello".into()),
        }
        .validate()
        .unwrap();

        assert_eq!(post.slug, "hello");
    }
}
