use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(auth_public_routes())
        .merge(post_routes())
        // Signed-in users
        .merge(protected_routes(state.clone()))
        // ADMIN_EMAIL only
        .merge(admin_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/join", post(auth::join_post))
        .route("/auth/login", post(auth::login_post))
}

fn post_routes() -> Router<AppState> {
    use public::posts;

    Router::new()
        .route("/posts", get(posts::posts_index))
        .route("/posts/:slug", get(posts::post_show))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, notes};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/notes", get(notes::notes_index).post(notes::note_create))
        .route("/notes/:id", get(notes::note_show).delete(notes::note_delete))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn admin_routes() -> Router<AppState> {
    use elevated::posts;

    Router::new()
        .route("/posts/admin", get(posts::admin_index))
        .route(
            "/posts/admin/:slug",
            get(posts::admin_show).post(posts::admin_action),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
