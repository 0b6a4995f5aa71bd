// handlers/public/system.rs - GET /, GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Quill API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Blog posts and personal notes",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/auth/join, /auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (user)",
                "posts": "/posts, /posts/:slug (public)",
                "notes": "/notes[/:id] (user)",
                "admin": "/posts/admin[/:slug] (admin)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": state.store.engine_name()
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": state.store.engine_name()
                    }
                })),
            )
        }
    }
}
