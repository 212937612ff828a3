use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::{
    errors::INVALID_INPUT,
    models::posts::{Likes, Post},
    repositories::posts_repo::PostsRepository,
    sanitize::{parse_identifier, sanitize},
    Error, Result,
};

/// Flips a single user's membership in a post's set of likers.
///
/// The toggle reads the post, computes the new map and writes it back only if
/// the post's version has not moved since the read. A conflicting write makes
/// the service re-read and recompute, so concurrent toggles by different users
/// never overwrite each other. Storage failures are returned as they happen
/// and are not retried.
///
/// Every conflict means some other toggle on the same post landed, so the post
/// as a whole keeps making progress. A single request can still lose the race
/// `max_attempts` times in a row when that many writers hit one post at once;
/// it then fails with [`Error::InternalServerError`] (500) and nothing of its
/// own is written, so the client may resend it. Raise `LIKE_MAX_ATTEMPTS` for
/// posts that draw bursts of simultaneous likes.
#[derive(Clone)]
pub struct LikesService {
    posts_repo: Arc<dyn PostsRepository>,
    max_attempts: u32,
}

impl LikesService {
    pub fn new(posts_repo: Arc<dyn PostsRepository>, max_attempts: u32) -> Self {
        Self {
            posts_repo,
            max_attempts: max_attempts.max(1),
        }
    }

    #[instrument(skip(self))]
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Post> {
        let user_id = sanitize(user_id);
        if user_id.is_empty() {
            return Err(Error::BadRequest(INVALID_INPUT.to_string()));
        }
        let post_id = parse_identifier(post_id).ok_or(Error::PostNotFound)?;

        for attempt in 1..=self.max_attempts {
            let post = self
                .posts_repo
                .get_post(post_id)
                .await?
                .ok_or(Error::PostNotFound)?;

            let likes = toggled(&post.likes, &user_id);

            if let Some(updated) = self
                .posts_repo
                .replace_likes_if_version(post_id, &likes, post.version)
                .await?
            {
                debug!(
                    %post_id,
                    attempt,
                    liked = updated.is_liked_by(&user_id),
                    "Like toggled"
                );
                return Ok(updated);
            }

            warn!(%post_id, attempt, "Post changed while toggling like, retrying");
            tokio::task::yield_now().await;
        }

        error!(
            %post_id,
            attempts = self.max_attempts,
            "Giving up on like toggle after repeated conflicts"
        );
        Err(Error::InternalServerError)
    }
}

fn toggled(likes: &Likes, user_id: &str) -> Likes {
    let mut likes = likes.clone();
    if likes.get(user_id).copied().unwrap_or(false) {
        likes.remove(user_id);
    } else {
        likes.insert(user_id.to_string(), true);
    }
    likes
}
