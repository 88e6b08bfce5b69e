use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub author_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes: i32,
}

/// Fields supplied when creating a post; `id`, `created_at` and `likes` are assigned by storage
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub author_image: Option<String>,
}
