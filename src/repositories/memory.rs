use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::{
        posts::{Likes, Page, Post},
        users::User,
    },
    Result,
};

use super::{posts_repo::PostsRepository, user_repo::UserRepository};

/// Process-local store used when no database is configured. Posts keep
/// insertion order, which stands in for storage order.
#[derive(Clone, Default)]
pub struct InMemoryRepo {
    posts: Arc<RwLock<Vec<Post>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate(posts: impl Iterator<Item = Post>, page: Option<Page>) -> Vec<Post> {
    match page {
        Some(page) => posts
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect(),
        None => posts.collect(),
    }
}

#[async_trait]
impl PostsRepository for InMemoryRepo {
    async fn get_posts(&self, page: Option<Page>) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(paginate(posts.iter().cloned(), page))
    }

    async fn get_user_posts(&self, user_id: Uuid, page: Option<Page>) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(paginate(
            posts.iter().filter(|post| post.user_id == user_id).cloned(),
            page,
        ))
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| post.id == post_id).cloned())
    }

    async fn create_post(
        &self,
        user_id: Uuid,
        description: Option<&str>,
        picture_path: Option<&str>,
    ) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::now_v7(),
            user_id,
            description: description.map(str::to_string),
            picture_path: picture_path.map(str::to_string),
            likes: Likes::new(),
            comments: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };

        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn replace_likes(&self, post_id: Uuid, likes: &Likes) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|post| post.id == post_id) else {
            return Ok(None);
        };

        post.likes = likes.clone();
        post.version += 1;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn replace_likes_if_version(
        &self,
        post_id: Uuid,
        likes: &Likes,
        expected_version: i64,
    ) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts
            .iter_mut()
            .find(|post| post.id == post_id && post.version == expected_version)
        else {
            return Ok(None);
        };

        post.likes = likes.clone();
        post.version += 1;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepo {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.users.read().await.contains_key(&user_id))
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conditional_write_rejects_stale_version() {
        let repo = InMemoryRepo::new();
        let post = repo.create_post(Uuid::now_v7(), None, None).await.unwrap();

        let mut likes = Likes::new();
        likes.insert("a".to_string(), true);

        let updated = repo
            .replace_likes_if_version(post.id, &likes, post.version)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.version, post.version + 1);

        let stale = repo
            .replace_likes_if_version(post.id, &Likes::new(), post.version)
            .await
            .unwrap();
        assert!(stale.is_none());
        assert!(repo.get_post(post.id).await.unwrap().unwrap().is_liked_by("a"));
    }

    #[tokio::test]
    async fn blind_write_loses_interleaved_update() {
        let repo = InMemoryRepo::new();
        let post = repo.create_post(Uuid::now_v7(), None, None).await.unwrap();

        // Two togglers read the same snapshot before either writes.
        let first_read = repo.get_post(post.id).await.unwrap().unwrap();
        let second_read = repo.get_post(post.id).await.unwrap().unwrap();

        let mut first = first_read.likes.clone();
        first.insert("alice".to_string(), true);
        let mut second = second_read.likes.clone();
        second.insert("bob".to_string(), true);

        repo.replace_likes(post.id, &first).await.unwrap();
        let stored = repo.replace_likes(post.id, &second).await.unwrap().unwrap();

        assert!(stored.is_liked_by("bob"));
        assert!(!stored.is_liked_by("alice"));
    }

    #[tokio::test]
    async fn replace_likes_on_missing_post_is_none() {
        let repo = InMemoryRepo::new();
        let missing = repo.replace_likes(Uuid::now_v7(), &Likes::new()).await.unwrap();
        assert!(missing.is_none());
    }
}
