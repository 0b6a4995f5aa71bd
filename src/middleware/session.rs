// Session gates. `require_user` and `require_admin_user` are also exposed as
// extractors so each route declares its own gate in its signature.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::warn;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::auth::{authenticate, AuthUser};
use crate::state::AppState;

/// Load the session user; a valid token for a deleted user is still a 401
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let auth_user = authenticate(state, headers)?;
    load_session_user(state, &auth_user).await
}

/// Like `require_user`, but only the configured admin passes
pub async fn require_admin_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let user = require_user(state, headers).await?;
    ensure_admin(state, user)
}

/// Never fails; any token problem reads as "not signed in"
pub async fn optional_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    let auth_user = authenticate(state, headers).ok()?;
    load_session_user(state, &auth_user).await.ok()
}

pub async fn optional_admin_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    optional_user(state, headers)
        .await
        .filter(|user| state.is_admin(user))
}

async fn load_session_user(state: &AppState, auth_user: &AuthUser) -> Result<User, ApiError> {
    state
        .users()
        .get_user_by_id(&auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session user no longer exists"))
}

fn ensure_admin(state: &AppState, user: User) -> Result<User, ApiError> {
    if state.is_admin(&user) {
        Ok(user)
    } else {
        warn!("Rejected non-admin user {} on an admin route", user.email);
        Err(ApiError::forbidden("Admin access required"))
    }
}

/// Reuses the `AuthUser` left by `jwt_auth_middleware` when present
async fn session_user(parts: &Parts, state: &AppState) -> Result<User, ApiError> {
    match parts.extensions.get::<AuthUser>().cloned() {
        Some(auth_user) => load_session_user(state, &auth_user).await,
        None => require_user(state, &parts.headers).await,
    }
}

/// Signed-in user (401 otherwise)
pub struct CurrentUser(pub User);

/// Signed-in admin (401 without a session, 403 for other users)
pub struct AdminUser(pub User);

/// Signed-in user if any
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        session_user(parts, state).await.map(CurrentUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = session_user(parts, state).await?;
        ensure_admin(state, user).map(AdminUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(optional_user(state, &parts.headers).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use crate::testing::test_state;
    use axum::http::{HeaderValue, StatusCode};

    fn bearer(state: &AppState, user: &User) -> HeaderMap {
        let claims = Claims::new(&user.id, &user.email, 1).unwrap();
        let token = generate_jwt(&claims, &state.config.security.session_secret).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn admin_gate_checks_the_configured_email() {
        let state = test_state();
        let admin = state.users().create_user("admin@quill.test", "adminpass1").await.unwrap();
        let reader = state.users().create_user("reader@quill.test", "readerpass1").await.unwrap();

        let user = require_admin_user(&state, &bearer(&state, &admin)).await.unwrap();
        assert_eq!(user.id, admin.id);

        let err = require_admin_user(&state, &bearer(&state, &reader)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = require_admin_user(&state, &HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleted_users_lose_their_session() {
        let state = test_state();
        let user = state.users().create_user("gone@quill.test", "password1").await.unwrap();
        let headers = bearer(&state, &user);
        state.users().delete_user_by_email("gone@quill.test").await.unwrap();

        let err = require_user(&state, &headers).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(optional_user(&state, &headers).await.is_none());
    }

    #[tokio::test]
    async fn optional_admin_is_none_for_readers() {
        let state = test_state();
        let reader = state.users().create_user("reader@quill.test", "readerpass1").await.unwrap();
        assert!(optional_admin_user(&state, &bearer(&state, &reader)).await.is_none());
        assert!(optional_admin_user(&state, &HeaderMap::new()).await.is_none());
    }
}
