use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Comment, NewResource, Post, Resource, ResourceKind};

/// Data-access seam used by the request handlers
#[async_trait]
pub trait ForumRepository: Send + Sync {
    async fn get_resource_by_id(&self, kind: ResourceKind, id: i32) -> Result<Option<Resource>, DatabaseError>;

    async fn create_resource(&self, new_resource: NewResource) -> Result<Resource, DatabaseError>;

    /// Single atomic `likes + 1`; concurrent likes are never lost
    async fn increment_likes(&self, kind: ResourceKind, id: i32) -> Result<(), DatabaseError>;

    /// Returns whether a row matching both `id` and `require_author_id` was removed
    async fn delete_resource(
        &self,
        kind: ResourceKind,
        id: i32,
        require_author_id: &str,
    ) -> Result<bool, DatabaseError>;

    /// Newest first, with the total row count for pagination
    async fn list_resources(
        &self,
        kind: ResourceKind,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Resource>, i64), DatabaseError>;

    /// Comments of a post, oldest first
    async fn list_comments(&self, post_id: i32) -> Result<Vec<Comment>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

const POST_COLUMNS: &str = "id, title, content, author_id, author_name, author_image, created_at, likes";
const COMMENT_COLUMNS: &str = "id, post_id, content, author_id, author_name, author_image, created_at, likes";

/// PostgreSQL-backed repository over `forum_posts` / `forum_comments`
#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForumRepository for PgForumRepository {
    async fn get_resource_by_id(&self, kind: ResourceKind, id: i32) -> Result<Option<Resource>, DatabaseError> {
        let resource = match kind {
            ResourceKind::Post => {
                let sql = format!("SELECT {} FROM forum_posts WHERE id = $1", POST_COLUMNS);
                sqlx::query_as::<_, Post>(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(Resource::Post)
            }
            ResourceKind::Comment => {
                let sql = format!("SELECT {} FROM forum_comments WHERE id = $1", COMMENT_COLUMNS);
                sqlx::query_as::<_, Comment>(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(Resource::Comment)
            }
        };
        Ok(resource)
    }

    async fn create_resource(&self, new_resource: NewResource) -> Result<Resource, DatabaseError> {
        let resource = match new_resource {
            NewResource::Post(post) => {
                let sql = format!(
                    "INSERT INTO forum_posts (title, content, author_id, author_name, author_image) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                    POST_COLUMNS
                );
                let row = sqlx::query_as::<_, Post>(&sql)
                    .bind(&post.title)
                    .bind(&post.content)
                    .bind(&post.author_id)
                    .bind(&post.author_name)
                    .bind(&post.author_image)
                    .fetch_one(&self.pool)
                    .await?;
                Resource::Post(row)
            }
            NewResource::Comment(comment) => {
                let sql = format!(
                    "INSERT INTO forum_comments (post_id, content, author_id, author_name, author_image) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                    COMMENT_COLUMNS
                );
                let row = sqlx::query_as::<_, Comment>(&sql)
                    .bind(comment.post_id)
                    .bind(&comment.content)
                    .bind(&comment.author_id)
                    .bind(&comment.author_name)
                    .bind(&comment.author_image)
                    .fetch_one(&self.pool)
                    .await?;
                Resource::Comment(row)
            }
        };
        Ok(resource)
    }

    async fn increment_likes(&self, kind: ResourceKind, id: i32) -> Result<(), DatabaseError> {
        let sql = format!("UPDATE {} SET likes = likes + 1 WHERE id = $1", kind.table_name());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_resource(
        &self,
        kind: ResourceKind,
        id: i32,
        require_author_id: &str,
    ) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND author_id = $2", kind.table_name());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(require_author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Resource>, i64), DatabaseError> {
        let items = match kind {
            ResourceKind::Post => {
                let sql = format!(
                    "SELECT {} FROM forum_posts ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
                    POST_COLUMNS
                );
                sqlx::query_as::<_, Post>(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
                    .into_iter()
                    .map(Resource::Post)
                    .collect()
            }
            ResourceKind::Comment => {
                let sql = format!(
                    "SELECT {} FROM forum_comments ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
                    COMMENT_COLUMNS
                );
                sqlx::query_as::<_, Comment>(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
                    .into_iter()
                    .map(Resource::Comment)
                    .collect()
            }
        };

        let count_sql = format!("SELECT COUNT(*) FROM {}", kind.table_name());
        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await?;

        Ok((items, total))
    }

    async fn list_comments(&self, post_id: i32) -> Result<Vec<Comment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM forum_comments WHERE post_id = $1 ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
