use crate::auth::Identity;
use crate::database::models::Resource;
use crate::error::ApiError;

/// Only the author may mutate a resource. There is no role or admin override.
pub fn authorize(identity: &Identity, resource: &Resource) -> Result<(), ApiError> {
    if identity.id == resource.author_id() {
        return Ok(());
    }

    tracing::warn!(
        caller = %identity.id,
        owner = %resource.author_id(),
        kind = %resource.kind(),
        id = resource.id(),
        "Ownership check failed"
    );
    Err(ApiError::forbidden(format!(
        "You are not authorized to delete this {}",
        resource.kind()
    )))
}
