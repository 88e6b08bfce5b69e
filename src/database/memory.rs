use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Comment, NewResource, Post, Resource, ResourceKind};
use crate::database::repository::ForumRepository;

/// In-process repository used when no DATABASE_URL is configured, and by tests.
/// Mirrors the PostgreSQL schema semantics, including the comment cascade on post delete.
#[derive(Default)]
pub struct MemoryForumRepository {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i32, Post>,
    comments: BTreeMap<i32, Comment>,
    last_post_id: i32,
    last_comment_id: i32,
}

impl MemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForumRepository for MemoryForumRepository {
    async fn get_resource_by_id(&self, kind: ResourceKind, id: i32) -> Result<Option<Resource>, DatabaseError> {
        let tables = self.tables.read().await;
        let resource = match kind {
            ResourceKind::Post => tables.posts.get(&id).cloned().map(Resource::Post),
            ResourceKind::Comment => tables.comments.get(&id).cloned().map(Resource::Comment),
        };
        Ok(resource)
    }

    async fn create_resource(&self, new_resource: NewResource) -> Result<Resource, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        match new_resource {
            NewResource::Post(new) => {
                tables.last_post_id += 1;
                let post = Post {
                    id: tables.last_post_id,
                    title: new.title,
                    content: new.content,
                    author_id: new.author_id,
                    author_name: new.author_name,
                    author_image: new.author_image,
                    created_at: now,
                    likes: 0,
                };
                tables.posts.insert(post.id, post.clone());
                Ok(Resource::Post(post))
            }
            NewResource::Comment(new) => {
                if !tables.posts.contains_key(&new.post_id) {
                    return Err(DatabaseError::QueryError(format!(
                        "forum_comments.post_id references missing post {}",
                        new.post_id
                    )));
                }
                tables.last_comment_id += 1;
                let comment = Comment {
                    id: tables.last_comment_id,
                    post_id: new.post_id,
                    content: new.content,
                    author_id: new.author_id,
                    author_name: new.author_name,
                    author_image: new.author_image,
                    created_at: now,
                    likes: 0,
                };
                tables.comments.insert(comment.id, comment.clone());
                Ok(Resource::Comment(comment))
            }
        }
    }

    async fn increment_likes(&self, kind: ResourceKind, id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        // Like the SQL UPDATE, a missing row is not an error
        match kind {
            ResourceKind::Post => {
                if let Some(post) = tables.posts.get_mut(&id) {
                    post.likes += 1;
                }
            }
            ResourceKind::Comment => {
                if let Some(comment) = tables.comments.get_mut(&id) {
                    comment.likes += 1;
                }
            }
        }
        Ok(())
    }

    async fn delete_resource(
        &self,
        kind: ResourceKind,
        id: i32,
        require_author_id: &str,
    ) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        match kind {
            ResourceKind::Post => {
                let owned = tables.posts.get(&id).is_some_and(|p| p.author_id == require_author_id);
                if !owned {
                    return Ok(false);
                }
                tables.posts.remove(&id);
                tables.comments.retain(|_, c| c.post_id != id);
                Ok(true)
            }
            ResourceKind::Comment => {
                let owned = tables.comments.get(&id).is_some_and(|c| c.author_id == require_author_id);
                if owned {
                    tables.comments.remove(&id);
                }
                Ok(owned)
            }
        }
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Resource>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        // Ids are assigned in creation order, so reverse id order is newest first
        let (items, total) = match kind {
            ResourceKind::Post => (
                tables.posts.values().rev().skip(skip).take(take).cloned().map(Resource::Post).collect(),
                tables.posts.len(),
            ),
            ResourceKind::Comment => (
                tables.comments.values().rev().skip(skip).take(take).cloned().map(Resource::Comment).collect(),
                tables.comments.len(),
            ),
        };

        Ok((items, total as i64))
    }

    async fn list_comments(&self, post_id: i32) -> Result<Vec<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}
