use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Validation contract for request bodies: each DTO names its required fields once
pub trait RequiredFields: DeserializeOwned {
    /// Message returned when any required field is missing or blank
    const MESSAGE: &'static str;

    fn required_fields(&self) -> Vec<(&'static str, Option<&str>)>;

    fn validate(&self) -> Result<(), ApiError> {
        let field_errors: HashMap<String, String> = self
            .required_fields()
            .into_iter()
            .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| (name.to_string(), "This field is required".to_string()))
            .collect();

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(Self::MESSAGE, Some(field_errors)))
        }
    }
}

/// JSON body extractor that rejects with the API envelope and enforces `RequiredFields`
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: RequiredFields,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;

        value.validate()?;
        Ok(Self(value))
    }
}
