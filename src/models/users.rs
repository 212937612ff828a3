use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "picturePath")]
    pub picture_path: Option<String>,
    #[serde(rename = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            picture_path: None,
            created_at: Utc::now(),
        }
    }
}
