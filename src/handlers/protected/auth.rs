// handlers/protected/auth.rs - GET /api/auth/whoami

use axum::extract::State;
use serde::Serialize;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user: User,
    pub is_admin: bool,
}

pub async fn whoami_get(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<WhoAmI> {
    let is_admin = state.is_admin(&user);
    Ok(ApiResponse::success(WhoAmI { user, is_admin }))
}
