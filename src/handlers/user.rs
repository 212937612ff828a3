use std::sync::Arc;

use axum::{
    extract::Path, middleware, response::IntoResponse, routing::get, Extension, Json, Router,
};

use crate::{middleware::auth, AppState, Result};

pub fn users_handler() -> Router {
    Router::new()
        .route("/{id}", get(get_user))
        .route_layer(middleware::from_fn(auth))
}

async fn get_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let user = app_state.users_service.get_user(&user_id).await?;
    Ok(Json(user))
}
