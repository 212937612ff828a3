use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::{
    models::posts::{ListPostsQuery, Post},
    repositories::posts_repo::PostsRepository,
    sanitize::parse_identifier,
    Result,
};

#[derive(Clone)]
pub struct FeedService {
    posts_repo: Arc<dyn PostsRepository>,
}

impl FeedService {
    pub fn new(posts_repo: Arc<dyn PostsRepository>) -> Self {
        Self { posts_repo }
    }

    #[instrument(skip(self))]
    pub async fn get_feed_posts(&self, query: ListPostsQuery) -> Result<Vec<Post>> {
        query.validate()?;

        self.posts_repo.get_posts(query.page()).await
    }

    /// Posts authored by `user_id`. An id that cannot name a user yields an
    /// empty list rather than an error.
    #[instrument(skip(self))]
    pub async fn get_user_posts(&self, user_id: &str, query: ListPostsQuery) -> Result<Vec<Post>> {
        query.validate()?;

        let Some(user_id) = parse_identifier(user_id) else {
            return Ok(Vec::new());
        };

        self.posts_repo.get_user_posts(user_id, query.page()).await
    }
}
