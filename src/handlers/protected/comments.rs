// handlers/protected/comments.rs - POST /posts/:id/comments, POST /comments/:id/like, DELETE /comments/:id

use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::Value;

use crate::auth::Identity;
use crate::database::models::{Comment, NewComment, NewResource, Post, ResourceKind};
use crate::error::ApiError;
use crate::handlers::dto::{author_name_or_default, CreateCommentRequest};
use crate::handlers::utils::{delete_owned, like_existing, load_resource, parse_id};
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::notify::{self, extract_mentions, Notification, NotificationContext, NotificationKind};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedComment {
    pub comment: Comment,
}

/// POST /posts/:id/comments - comment on an existing post
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Path(post_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<CreatedComment> {
    let post_id = parse_id(ResourceKind::Post, &post_id)?;

    let post = load_resource(state.repository.as_ref(), ResourceKind::Post, post_id)
        .await?
        .into_post()
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let new_comment = NewComment {
        post_id,
        content: body.content.unwrap_or_default(),
        author_id: identity.id.clone(),
        author_name: author_name_or_default(body.author_name),
        author_image: body.author_image,
    };

    let comment = state
        .repository
        .create_resource(NewResource::Comment(new_comment))
        .await
        .map_err(|e| ApiError::storage("Failed to create comment", e))?
        .into_comment()
        .ok_or_else(|| ApiError::internal_server_error("Failed to create comment"))?;

    tracing::info!(user = %identity.id, post_id, comment_id = comment.id, "Comment created");

    notify::dispatch(state.notifier.clone(), comment_notifications(&post, &comment));

    Ok(ApiResponse::created(CreatedComment { comment }))
}

/// POST /comments/:id/like
pub async fn like(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(ResourceKind::Comment, &id)?;
    like_existing(state.repository.as_ref(), &identity, ResourceKind::Comment, id).await
}

/// DELETE /comments/:id - author only
pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(ResourceKind::Comment, &id)?;
    delete_owned(state.repository.as_ref(), &identity, ResourceKind::Comment, id).await
}

/// The post author hears about comments from others; every distinct @mention is notified
fn comment_notifications(post: &Post, comment: &Comment) -> Vec<Notification> {
    let context = |recipient_name: Option<String>| NotificationContext {
        post_id: post.id,
        post_title: post.title.clone(),
        comment_content: Some(comment.content.clone()),
        recipient_name,
    };

    let mut notifications = Vec::new();

    if post.author_id != comment.author_id {
        notifications.push(Notification {
            kind: NotificationKind::NewComment,
            recipient: post.author_id.clone(),
            context: context(Some(post.author_name.clone())),
        });
    }

    for username in extract_mentions(&comment.content) {
        notifications.push(Notification {
            kind: NotificationKind::Mention,
            recipient: username,
            context: context(None),
        });
    }

    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(author_id: &str) -> Post {
        Post {
            id: 9,
            title: "Topic".to_string(),
            content: "Body".to_string(),
            author_id: author_id.to_string(),
            author_name: "Poster".to_string(),
            author_image: None,
            created_at: Utc::now(),
            likes: 0,
        }
    }

    fn comment(author_id: &str, content: &str) -> Comment {
        Comment {
            id: 1,
            post_id: 9,
            content: content.to_string(),
            author_id: author_id.to_string(),
            author_name: "Commenter".to_string(),
            author_image: None,
            created_at: Utc::now(),
            likes: 0,
        }
    }

    #[test]
    fn post_author_and_mentions_are_notified() {
        let notifications = comment_notifications(&post("p@example.com"), &comment("c@example.com", "cc @alice @bob @alice"));

        let summary: Vec<_> = notifications.iter().map(|n| (n.kind, n.recipient.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (NotificationKind::NewComment, "p@example.com"),
                (NotificationKind::Mention, "alice"),
                (NotificationKind::Mention, "bob"),
            ]
        );
        assert_eq!(notifications[0].context.recipient_name.as_deref(), Some("Poster"));
    }

    #[test]
    fn commenting_on_own_post_skips_author_notice() {
        let notifications = comment_notifications(&post("p@example.com"), &comment("p@example.com", "thanks all"));
        assert!(notifications.is_empty());
    }
}
