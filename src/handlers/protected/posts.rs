// handlers/protected/posts.rs - POST /posts, POST /posts/:id/like, DELETE /posts/:id

use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::Value;

use crate::auth::Identity;
use crate::database::models::{NewPost, NewResource, Post, ResourceKind};
use crate::error::ApiError;
use crate::handlers::dto::{author_name_or_default, CreatePostRequest};
use crate::handlers::utils::{delete_owned, like_existing, parse_id};
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::notify::{self, Notification, NotificationContext, NotificationKind};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub post: Post,
}

/// POST /posts - create a post owned by the caller
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedJson(body): ValidatedJson<CreatePostRequest>,
) -> ApiResult<CreatedPost> {
    let new_post = NewPost {
        title: body.title.unwrap_or_default(),
        content: body.content.unwrap_or_default(),
        author_id: identity.id.clone(),
        author_name: author_name_or_default(body.author_name),
        author_image: body.author_image,
    };

    let post = state
        .repository
        .create_resource(NewResource::Post(new_post))
        .await
        .map_err(|e| ApiError::storage("Failed to create post", e))?
        .into_post()
        .ok_or_else(|| ApiError::internal_server_error("Failed to create post"))?;

    tracing::info!(user = %identity.id, post_id = post.id, "Post created");

    notify::dispatch(
        state.notifier.clone(),
        new_post_notifications(&post, &state.settings.new_post_recipients),
    );

    Ok(ApiResponse::created(CreatedPost { post }))
}

/// POST /posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(ResourceKind::Post, &id)?;
    like_existing(state.repository.as_ref(), &identity, ResourceKind::Post, id).await
}

/// DELETE /posts/:id - author only; the post's comments go with it
pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(ResourceKind::Post, &id)?;
    delete_owned(state.repository.as_ref(), &identity, ResourceKind::Post, id).await
}

/// Subscribers hear about every new post except their own
fn new_post_notifications(post: &Post, recipients: &[String]) -> Vec<Notification> {
    recipients
        .iter()
        .filter(|recipient| **recipient != post.author_id)
        .map(|recipient| Notification {
            kind: NotificationKind::NewPost,
            recipient: recipient.clone(),
            context: NotificationContext {
                post_id: post.id,
                post_title: post.title.clone(),
                comment_content: None,
                recipient_name: None,
            },
        })
        .collect()
}
