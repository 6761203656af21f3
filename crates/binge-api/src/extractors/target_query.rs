//! Target query extractor
//!
//! Extracts the toggle mode and the optional parent key segment.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use binge_core::ToggleMode;
use binge_service::dto::ToggleReactionQuery;

use crate::response::ApiError;

/// Parsed `?mode=&parent=` options of a target route
#[derive(Debug, Clone, Default)]
pub struct TargetQuery {
    pub mode: ToggleMode,
    pub parent: Option<String>,
}

impl TargetQuery {
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

impl From<ToggleReactionQuery> for TargetQuery {
    fn from(query: ToggleReactionQuery) -> Self {
        Self {
            mode: query.mode,
            // `?parent=` is treated as absent
            parent: query.parent.filter(|p| !p.is_empty()),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TargetQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ToggleReactionQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Ok(query.into())
    }
}
