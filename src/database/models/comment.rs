use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub author_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes: i32,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i32,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub author_image: Option<String>,
}
