// handlers/public/posts.rs - GET /posts and GET /posts/:id

use axum::extract::{Path, Query, State};
use serde::Serialize;

use crate::database::models::{Comment, Post, ResourceKind};
use crate::error::ApiError;
use crate::handlers::dto::ListQuery;
use crate::handlers::utils::{load_resource, parse_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// GET /posts - newest first, paginated
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<PostList> {
    let page = query.page(state.settings.default_page_size, state.settings.max_page_size);

    let (items, total) = state
        .repository
        .list_resources(ResourceKind::Post, page.limit, page.offset())
        .await
        .map_err(|e| ApiError::storage("Failed to get posts", e))?;

    let posts = items.into_iter().filter_map(|r| r.into_post()).collect();

    Ok(ApiResponse::success(PostList {
        posts,
        pagination: Pagination {
            total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total),
        },
    }))
}

/// GET /posts/:id - a post with its comments, oldest comment first
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PostDetail> {
    let id = parse_id(ResourceKind::Post, &id)?;

    let post = load_resource(state.repository.as_ref(), ResourceKind::Post, id)
        .await?
        .into_post()
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let comments = state
        .repository
        .list_comments(id)
        .await
        .map_err(|e| ApiError::storage("Failed to get post", e))?;

    Ok(ApiResponse::success(PostDetail { post, comments }))
}
