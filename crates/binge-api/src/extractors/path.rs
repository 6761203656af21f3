//! Path parameter extractors
//!
//! Type-safe extraction of target keys and Snowflake IDs from path parameters.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use binge_core::{ReactionKind, Snowflake, TargetKey};
use serde::de::DeserializeOwned;

use crate::response::ApiError;

/// Path extractor whose rejection is an [`ApiError`]
#[derive(Debug, Clone)]
pub struct PathParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(PathParams(inner))
    }
}

/// `/targets/{target_type}/{target_id}/reactions/{kind}`
#[derive(Debug, serde::Deserialize)]
pub struct TargetPath {
    pub target_type: String,
    pub target_id: String,
    pub kind: String,
}

impl TargetPath {
    /// Target key, with the optional parent segment from the query string
    pub fn target_key(&self, parent: Option<&str>) -> Result<TargetKey, ApiError> {
        Ok(TargetKey::from_parts(
            &self.target_type,
            &self.target_id,
            parent,
        )?)
    }

    pub fn kind(&self) -> Result<ReactionKind, ApiError> {
        Ok(self.kind.parse()?)
    }
}

/// `/entities/{target_type}/{target_id}/...`
#[derive(Debug, serde::Deserialize)]
pub struct EntityPath {
    pub target_type: String,
    pub target_id: String,
}

impl EntityPath {
    pub fn target_key(&self) -> Result<TargetKey, ApiError> {
        Ok(TargetKey::from_parts(
            &self.target_type,
            &self.target_id,
            None,
        )?)
    }
}

/// `/notifications/{notification_id}`
#[derive(Debug, serde::Deserialize)]
pub struct NotificationIdPath {
    pub notification_id: String,
}

impl NotificationIdPath {
    pub fn notification_id(&self) -> Result<Snowflake, ApiError> {
        self.notification_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid notification_id format"))
    }
}
