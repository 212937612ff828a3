use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::{
    errors::INVALID_INPUT,
    models::posts::{CreatePostDto, Post},
    repositories::{posts_repo::PostsRepository, user_repo::UserRepository},
    sanitize::parse_identifier,
    Error, Result,
};

#[derive(Clone)]
pub struct PostsService {
    posts_repo: Arc<dyn PostsRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl PostsService {
    pub fn new(posts_repo: Arc<dyn PostsRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            posts_repo,
            user_repo,
        }
    }

    /// Validates the payload, checks the author exists and stores a post with
    /// no likes and no comments. Nothing is written when either check fails.
    #[instrument(skip(self, new_post))]
    pub async fn create_post(&self, new_post: CreatePostDto) -> Result<Post> {
        new_post.validate()?;

        let Some(raw_user_id) = new_post.user_id.as_deref() else {
            return Err(Error::BadRequest(INVALID_INPUT.to_string()));
        };

        let user_id = parse_identifier(raw_user_id).ok_or(Error::UserNotFound)?;
        if !self.user_repo.user_exists(user_id).await? {
            return Err(Error::UserNotFound);
        }

        let post = self
            .posts_repo
            .create_post(
                user_id,
                new_post.description.as_deref(),
                new_post.picture_path.as_deref(),
            )
            .await?;

        info!(post_id = %post.id, user_id = %user_id, "Post created");

        Ok(post)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        let post_id = parse_identifier(post_id).ok_or(Error::PostNotFound)?;

        self.posts_repo
            .get_post(post_id)
            .await?
            .ok_or(Error::PostNotFound)
    }
}
