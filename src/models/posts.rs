use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub type Likes = BTreeMap<String, bool>;

const DEFAULT_PAGE_LIMIT: u32 = 20;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub description: Option<String>,
    #[serde(rename = "picturePath")]
    pub picture_path: Option<String>,
    /// Set of users who currently like the post, stored as `userId -> true`.
    pub likes: Likes,
    pub comments: Vec<String>,
    #[serde(skip)]
    pub version: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.get(user_id).copied().unwrap_or(false)
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreatePostDto {
    #[validate(length(min = 1))]
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(url)]
    #[serde(rename = "picturePath")]
    pub picture_path: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LikePostDto {
    #[validate(length(min = 1))]
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Opt-in pagination for post listings. Leaving both fields out keeps the
/// unbounded listing.
#[derive(Validate, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct ListPostsQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl ListPostsQuery {
    pub fn page(&self) -> Option<Page> {
        if self.page.is_none() && self.limit.is_none() {
            return None;
        }

        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT) as i64;
        let page = self.page.unwrap_or(1).max(1) as i64;

        Some(Page {
            limit,
            offset: (page - 1) * limit,
        })
    }
}
