use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use social_posts_backend::{
    config::Config,
    models::{posts::CreatePostDto, users::User},
    repositories::{user_repo::UserRepository, InMemoryRepo},
    routes::create_routes,
    services::auth::Claims,
    AppState, Error,
};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";
const SEED_USERS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/users.json");
const SEEDED_USER_ID: &str = "0192d4a0-7c1e-7a3b-9f10-3c5e8b2a4d61";

struct TestApp {
    router: Router,
    token: String,
    user: User,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepo::new());
    let user = repo.create_user(&User::new("Ada", "Lovelace")).await.unwrap();

    let config = in_memory_config(None);
    let state = AppState::new(&config, repo.clone(), repo, None);

    TestApp {
        router: create_routes(Arc::new(state)),
        token: token_for(user.id),
        user,
    }
}

fn in_memory_config(seed_users_path: Option<&str>) -> Config {
    Config {
        database_url: None,
        port: 0,
        jwt_secret: SECRET.to_string(),
        max_connections: 1,
        like_max_attempts: 5,
        seed_users_path: seed_users_path.map(str::to_string),
    }
}

fn token_for(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));

        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_post(&self, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/posts", Some(body)).await
    }

    async fn toggle(&self, post_id: &str, user_id: &str) -> (StatusCode, Value) {
        self.send(
            Method::PATCH,
            &format!("/posts/{post_id}/like"),
            Some(json!({ "userId": user_id })),
        )
        .await
    }
}

#[tokio::test]
async fn create_then_like_then_unlike() {
    let app = spawn_app().await;

    let (status, post) = app
        .create_post(json!({ "userId": app.user.id, "description": "hi" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["likes"], json!({}));
    assert_eq!(post["comments"], json!([]));
    assert_eq!(post["description"], "hi");
    assert_eq!(post["userId"], app.user.id.to_string());
    let id = post["id"].as_str().unwrap().to_string();

    let (status, liked) = app.toggle(&id, "u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["likes"], json!({ "u2": true }));

    let (status, unliked) = app.toggle(&id, "u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unliked["likes"], json!({}));
}

#[tokio::test]
async fn create_with_unknown_user_is_a_bad_request() {
    let app = spawn_app().await;

    let (status, body) = app
        .create_post(json!({ "userId": Uuid::now_v7(), "description": "hi" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not found.");

    let (_, feed) = app.send(Method::GET, "/posts", None).await;
    assert_eq!(feed, json!([]));
}

#[tokio::test]
async fn create_rejects_invalid_payloads() {
    let app = spawn_app().await;
    let user_id = app.user.id;

    for payload in [
        json!({ "userId": user_id, "description": "x".repeat(501) }),
        json!({ "userId": user_id, "picturePath": "not-a-uri" }),
        json!({ "description": "no author" }),
        json!({ "userId": 42 }),
    ] {
        let (status, body) = app.create_post(payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["message"], "Invalid input.");
    }
}

#[tokio::test]
async fn liking_missing_post_is_not_found() {
    let app = spawn_app().await;

    let (status, body) = app.toggle(&Uuid::now_v7().to_string(), "u2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found.");
}

#[tokio::test]
async fn like_requires_a_user_id() {
    let app = spawn_app().await;
    let (_, post) = app.create_post(json!({ "userId": app.user.id })).await;
    let id = post["id"].as_str().unwrap();

    let (status, _) = app
        .send(Method::PATCH, &format!("/posts/{id}/like"), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feed_and_user_posts() {
    let app = spawn_app().await;

    let other = User::new("Alan", "Turing");
    let (status, _) = app
        .create_post(json!({ "userId": other.id, "description": "nope" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for text in ["one", "two", "three"] {
        let (status, _) = app
            .create_post(json!({ "userId": app.user.id, "description": text }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, feed) = app.send(Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed.as_array().unwrap().len(), 3);

    let (status, mine) = app
        .send(Method::GET, &format!("/posts/{}/posts", app.user.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 3);

    let (status, theirs) = app
        .send(Method::GET, &format!("/posts/{}/posts", other.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(theirs, json!([]));

    let (status, page) = app.send(Method::GET, "/posts?page=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["description"], "three");
}

#[tokio::test]
async fn malformed_pagination_is_a_json_bad_request() {
    let app = spawn_app().await;
    let user_posts = format!("/posts/{}/posts?limit=ten", app.user.id);

    for uri in [
        "/posts?page=abc",
        "/posts?page=-1",
        "/posts?limit=0",
        user_posts.as_str(),
    ] {
        let (status, body) = app.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid input.", "{uri}");
    }
}

#[tokio::test]
async fn get_single_post_and_user() {
    let app = spawn_app().await;
    let (_, post) = app
        .create_post(json!({ "userId": app.user.id, "description": "hi" }))
        .await;
    let id = post["id"].as_str().unwrap();

    let (status, fetched) = app.send(Method::GET, &format!("/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, post);

    let (status, user) = app
        .send(Method::GET, &format!("/users/{}", app.user.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["firstName"], "Ada");
}

#[tokio::test]
async fn requests_without_a_valid_token_are_rejected() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/posts")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/posts")
                .header(header::COOKIE, format!("token={}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_from_different_users_both_persist() {
    let app = Arc::new(spawn_app().await);
    let (_, post) = app.create_post(json!({ "userId": app.user.id })).await;
    let id = post["id"].as_str().unwrap().to_string();

    let first = tokio::spawn({
        let app = app.clone();
        let id = id.clone();
        async move { app.toggle(&id, "alice").await }
    });
    let second = tokio::spawn({
        let app = app.clone();
        let id = id.clone();
        async move { app.toggle(&id, "bob").await }
    });
    assert_eq!(first.await.unwrap().0, StatusCode::OK);
    assert_eq!(second.await.unwrap().0, StatusCode::OK);

    let (_, stored) = app.send(Method::GET, &format!("/posts/{id}"), None).await;
    assert_eq!(stored["likes"], json!({ "alice": true, "bob": true }));
}

#[tokio::test]
async fn in_memory_state_seeded_at_init_accepts_posts() {
    let state = AppState::init(in_memory_config(Some(SEED_USERS)))
        .await
        .unwrap();

    let post = state
        .posts_service
        .create_post(CreatePostDto {
            user_id: Some(SEEDED_USER_ID.to_string()),
            description: Some("hi".to_string()),
            picture_path: None,
        })
        .await
        .unwrap();
    assert_eq!(post.user_id.to_string(), SEEDED_USER_ID);

    let user_id: Uuid = SEEDED_USER_ID.parse().unwrap();
    let app = TestApp {
        router: create_routes(state),
        token: token_for(user_id),
        user: User::new("Ada", "Lovelace"),
    };
    let (status, created) = app
        .create_post(json!({ "userId": SEEDED_USER_ID, "description": "over http" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], SEEDED_USER_ID);

    let (status, user) = app
        .send(Method::GET, &format!("/users/{SEEDED_USER_ID}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["firstName"], "Ada");
}

#[tokio::test]
async fn unreadable_seed_file_fails_init() {
    let missing = std::env::temp_dir().join(format!("{}.json", Uuid::now_v7()));
    let result = AppState::init(in_memory_config(missing.to_str())).await;
    assert!(matches!(result, Err(Error::Config(_))));
}
