// handlers/public/auth.rs - POST /auth/join, POST /auth/login

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
    pub is_admin: bool,
}

/// POST /auth/join - create an account and start a session
pub async fn join_post(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<SessionPayload> {
    let email = credentials.email.trim();
    validate_email(email)?;
    if credentials.password.is_empty() {
        return Err(ApiError::field_error("password", "Password is required"));
    }
    if credentials.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::field_error("password", "Password is too short"));
    }

    let users = state.users();
    if users.get_user_by_email(email).await?.is_some() {
        return Err(ApiError::field_error("email", "A user already exists with this email"));
    }

    let user = users.create_user(email, &credentials.password).await?;
    info!("Created user {}", user.email);
    Ok(ApiResponse::created(start_session(&state, user)?))
}

/// POST /auth/login - verify credentials and start a session
pub async fn login_post(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<SessionPayload> {
    let email = credentials.email.trim();
    validate_email(email)?;
    if credentials.password.is_empty() {
        return Err(ApiError::field_error("password", "Password is required"));
    }

    let user = state
        .users()
        .verify_login(email, &credentials.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    Ok(ApiResponse::success(start_session(&state, user)?))
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.len() > 3 && email.contains('@') {
        Ok(())
    } else {
        Err(ApiError::field_error("email", "Email is invalid"))
    }
}

fn start_session(state: &AppState, user: User) -> Result<SessionPayload, ApiError> {
    let security = &state.config.security;
    let claims = Claims::new(&user.id, &user.email, security.jwt_expiry_hours)?;
    let token = generate_jwt(&claims, &security.session_secret)?;

    Ok(SessionPayload {
        token,
        expires_in: claims.lifetime_secs(),
        is_admin: state.is_admin(&user),
        user,
    })
}
