use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{posts::posts_handler, user::users_handler},
    AppState,
};

const BODY_LIMIT_BYTES: usize = 30 * 1024 * 1024;

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/posts", posts_handler())
        .nest("/users", users_handler())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}

pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
