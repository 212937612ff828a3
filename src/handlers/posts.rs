use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    errors::INVALID_INPUT,
    middleware::{auth, AuthUser},
    models::posts::{CreatePostDto, LikePostDto, ListPostsQuery},
    AppState, Error, Result,
};

pub fn posts_handler() -> Router {
    Router::new()
        .route("/", get(get_feed_posts).post(create_post))
        .route("/{id}", get(get_post))
        .route("/{id}/posts", get(get_user_posts))
        .route("/{id}/like", patch(like_post))
        .route_layer(middleware::from_fn(auth))
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    payload: std::result::Result<Json<CreatePostDto>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(new_post) = payload?;

    tracing::debug!(caller = %caller.user_id, "Creating post");

    let post = app_state.posts_service.create_post(new_post).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_feed_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    query: std::result::Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let posts = app_state.feed_service.get_feed_posts(query).await?;
    Ok((StatusCode::OK, Json(posts)))
}

async fn get_user_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: std::result::Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let posts = app_state
        .feed_service
        .get_user_posts(&user_id, query)
        .await?;
    Ok((StatusCode::OK, Json(posts)))
}

async fn get_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    let post = app_state.posts_service.get_post(&post_id).await?;
    Ok((StatusCode::OK, Json(post)))
}

async fn like_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
    payload: std::result::Result<Json<LikePostDto>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = payload?;
    body.validate()?;

    let user_id = body
        .user_id
        .as_deref()
        .ok_or_else(|| Error::BadRequest(INVALID_INPUT.to_string()))?;

    let post = app_state.likes_service.toggle_like(&post_id, user_id).await?;
    Ok((StatusCode::OK, Json(post)))
}
