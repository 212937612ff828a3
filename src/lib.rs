use std::sync::Arc;

use config::Config;
use models::users::User;
use repositories::{
    posts_repo::PostsRepository, user_repo::UserRepository, InMemoryRepo, PostgresRepo,
};
use services::{
    auth::AuthService, feed::FeedService, likes::LikesService, posts::PostsService,
    user::UserService,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

pub use self::errors::{Error, Result};

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod sanitize;
pub mod services;

/// Handle shared by every request. Built once at startup by [`AppState::init`]
/// and released with [`AppState::shutdown`].
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub posts_service: PostsService,
    pub likes_service: LikesService,
    pub feed_service: FeedService,
    pub users_service: UserService,
    db_pool: Option<PgPool>,
}

impl AppState {
    /// Connects to Postgres and applies migrations when `DATABASE_URL` is
    /// configured, otherwise falls back to an in-memory store. Users listed in
    /// `SEED_USERS_PATH` are loaded into whichever store was chosen.
    pub async fn init(config: Config) -> Result<Arc<Self>> {
        let (posts_repo, user_repo, db_pool): (
            Arc<dyn PostsRepository>,
            Arc<dyn UserRepository>,
            Option<PgPool>,
        ) = match config.database_url.as_deref() {
            None => {
                warn!("DATABASE_URL not set, posts and users are kept in memory");
                let repo = Arc::new(InMemoryRepo::new());
                (repo.clone(), repo, None)
            }
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(database_url)
                    .await?;
                info!("✅ Connection to the database is successful!");

                sqlx::migrate!("./migrations").run(&pool).await?;

                let repo = Arc::new(PostgresRepo::new(pool.clone()));
                (repo.clone(), repo, Some(pool))
            }
        };

        match &config.seed_users_path {
            Some(path) => seed_users(user_repo.as_ref(), path).await?,
            None if db_pool.is_none() => {
                warn!("SEED_USERS_PATH not set, the in-memory store starts without users")
            }
            None => {}
        }

        Ok(Arc::new(Self::new(&config, posts_repo, user_repo, db_pool)))
    }

    pub fn new(
        config: &Config,
        posts_repo: Arc<dyn PostsRepository>,
        user_repo: Arc<dyn UserRepository>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            auth_service: AuthService::new(config.jwt_secret.clone()),
            posts_service: PostsService::new(posts_repo.clone(), user_repo.clone()),
            likes_service: LikesService::new(posts_repo.clone(), config.like_max_attempts),
            feed_service: FeedService::new(posts_repo),
            users_service: UserService::new(user_repo),
            db_pool,
        }
    }

    pub async fn shutdown(&self) {
        if let Some(pool) = &self.db_pool {
            pool.close().await;
            info!("Database pool closed");
        }
    }
}

/// Loads a JSON array of users into the store. Existing ids are overwritten.
async fn seed_users(repo: &dyn UserRepository, path: &str) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config(format!("cannot read seed file {path}: {e}")))?;
    let users: Vec<User> = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("invalid seed file {path}: {e}")))?;

    for user in &users {
        repo.create_user(user).await?;
    }

    info!(count = users.len(), "Seeded users from {path}");
    Ok(())
}
