//! Authentication extractor
//!
//! Extracts and verifies bearer tokens from the Authorization header.
//! [`ServiceCaller`] additionally requires a subsystem credential.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use binge_core::{DomainError, Snowflake};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated user extracted from a bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Snowflake,
}

impl AuthUser {
    pub fn new(user_id: Snowflake) -> Self {
        Self { user_id }
    }
}

fn verify(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let user_id = state.token_verifier().verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Rejected bearer token");
        ApiError::App(e)
    })?;
    Ok(AuthUser::new(user_id))
}

async fn bearer_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Bearer, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::MissingAuth)?;
    Ok(bearer)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(parts, state).await?;
        verify(&AppState::from_ref(state), bearer.token())
    }
}

/// Another subsystem calling with a service-scoped token
///
/// User tokens are rejected with `PERMISSION_DENIED`.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCaller {
    pub caller_id: Snowflake,
}

#[async_trait]
impl<S> FromRequestParts<S> for ServiceCaller
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(parts, state).await?;
        let claims = AppState::from_ref(state)
            .token_verifier()
            .verify_claims(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected bearer token");
                ApiError::App(e)
            })?;

        if !claims.is_service() {
            tracing::warn!(subject = %claims.sub, "User token on service endpoint");
            return Err(DomainError::PermissionDenied(
                "a service credential is required".to_string(),
            )
            .into());
        }
        Ok(ServiceCaller {
            caller_id: claims.user_id()?,
        })
    }
}

/// Optional authenticated user
///
/// `None` when no Authorization header is present; an invalid token is
/// still rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn user_id(&self) -> Option<Snowflake> {
        self.0.map(|auth| auth.user_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => Ok(OptionalAuthUser(Some(verify(
                &AppState::from_ref(state),
                bearer.token(),
            )?))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}
