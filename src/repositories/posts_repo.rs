use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    models::posts::{Likes, Page, Post},
    Result,
};

use super::PostgresRepo;

const POST_COLUMNS: &str =
    "id, user_id, description, picture_path, likes, comments, version, created_at, updated_at";

#[async_trait]
pub trait PostsRepository: Sync + Send {
    async fn get_posts(&self, page: Option<Page>) -> Result<Vec<Post>>;
    async fn get_user_posts(&self, user_id: Uuid, page: Option<Page>) -> Result<Vec<Post>>;
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;
    async fn create_post(
        &self,
        user_id: Uuid,
        description: Option<&str>,
        picture_path: Option<&str>,
    ) -> Result<Post>;
    /// Overwrites `likes` without looking at what is currently stored.
    /// Concurrent read-modify-write cycles built on this lose updates.
    async fn replace_likes(&self, post_id: Uuid, likes: &Likes) -> Result<Option<Post>>;
    /// Overwrites `likes` only while the stored version still equals
    /// `expected_version`. `None` means the post is gone or was written since.
    async fn replace_likes_if_version(
        &self,
        post_id: Uuid,
        likes: &Likes,
        expected_version: i64,
    ) -> Result<Option<Post>>;
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    description: Option<String>,
    picture_path: Option<String>,
    likes: Json<Likes>,
    comments: Vec<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            user_id: row.user_id,
            description: row.description,
            picture_path: row.picture_path,
            likes: row.likes.0,
            comments: row.comments,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostsRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn get_posts(&self, page: Option<Page>) -> Result<Vec<Post>> {
        let rows = match page {
            Some(page) => {
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at, id LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, PostRow>(&sql)
                    .bind(page.limit)
                    .bind(page.offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {POST_COLUMNS} FROM posts");
                sqlx::query_as::<_, PostRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_user_posts(&self, user_id: Uuid, page: Option<Page>) -> Result<Vec<Post>> {
        let rows = match page {
            Some(page) => {
                let sql = format!(
                    r#"
                    SELECT {POST_COLUMNS} FROM posts
                    WHERE user_id = $1
                    ORDER BY created_at, id
                    LIMIT $2 OFFSET $3
                    "#
                );
                sqlx::query_as::<_, PostRow>(&sql)
                    .bind(user_id)
                    .bind(page.limit)
                    .bind(page.offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1");
                sqlx::query_as::<_, PostRow>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        tracing::debug!(count = rows.len(), "User posts fetched");

        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn create_post(
        &self,
        user_id: Uuid,
        description: Option<&str>,
        picture_path: Option<&str>,
    ) -> Result<Post> {
        let id = Uuid::now_v7();

        let sql = format!(
            r#"
            INSERT INTO posts (id, user_id, description, picture_path, likes, comments)
            VALUES ($1, $2, $3, $4, '{{}}'::jsonb, '{{}}'::text[])
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(description)
            .bind(picture_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    #[instrument(skip(self, likes))]
    async fn replace_likes(&self, post_id: Uuid, likes: &Likes) -> Result<Option<Post>> {
        let sql = format!(
            r#"
            UPDATE posts
            SET likes = $2,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(Json(likes))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self, likes))]
    async fn replace_likes_if_version(
        &self,
        post_id: Uuid,
        likes: &Likes,
        expected_version: i64,
    ) -> Result<Option<Post>> {
        let sql = format!(
            r#"
            UPDATE posts
            SET likes = $2,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $3
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(Json(likes))
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }
}
