// handlers/utils.rs - Steps shared by the post and comment handlers

use serde_json::Value;

use crate::auth::{authorize, Identity};
use crate::database::models::{Resource, ResourceKind};
use crate::database::ForumRepository;
use crate::error::ApiError;
use crate::middleware::ApiResponse;

/// Parse a `:id` path segment; anything but a positive integer is a 400
pub fn parse_id(kind: ResourceKind, raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {} id", kind)))
}

/// Load an existing resource or fail with "{Kind} not found"
pub async fn load_resource(
    repository: &dyn ForumRepository,
    kind: ResourceKind,
    id: i32,
) -> Result<Resource, ApiError> {
    repository
        .get_resource_by_id(kind, id)
        .await
        .map_err(|e| ApiError::storage(format!("Failed to load {}", kind), e))?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", kind.title())))
}

/// Like an existing post or comment
pub async fn like_existing(
    repository: &dyn ForumRepository,
    identity: &Identity,
    kind: ResourceKind,
    id: i32,
) -> Result<ApiResponse<Value>, ApiError> {
    load_resource(repository, kind, id).await?;

    repository
        .increment_likes(kind, id)
        .await
        .map_err(|e| ApiError::storage(format!("Failed to like {}", kind), e))?;

    tracing::debug!(user = %identity.id, %kind, id, "Liked");
    Ok(ApiResponse::message(format!("{} liked successfully", kind.title())))
}

/// Load, check ownership, then delete. A row that disappears between the load and the
/// delete reports 404, so only one of two racing deletes succeeds.
pub async fn delete_owned(
    repository: &dyn ForumRepository,
    identity: &Identity,
    kind: ResourceKind,
    id: i32,
) -> Result<ApiResponse<Value>, ApiError> {
    let resource = load_resource(repository, kind, id).await?;
    authorize(identity, &resource)?;

    let deleted = repository
        .delete_resource(kind, id, &identity.id)
        .await
        .map_err(|e| ApiError::storage(format!("Failed to delete {}", kind), e))?;

    if !deleted {
        return Err(ApiError::not_found(format!("{} not found", kind.title())));
    }

    tracing::info!(user = %identity.id, %kind, id, "Deleted");
    Ok(ApiResponse::message(format!("{} deleted successfully", kind.title())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parse_id_rejects_non_numeric_and_non_positive() {
        assert_eq!(parse_id(ResourceKind::Post, "42").unwrap(), 42);
        for raw in ["abc", "0", "-1", "1.5", ""] {
            let err = parse_id(ResourceKind::Comment, raw).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.message(), "Invalid comment id");
        }
    }
}
