use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{claims::IdentityContext, errors::AuthError, services::AuthService};

/// Extracts and validates the bearer JWT, yielding the caller's identity.
pub struct AuthUser(pub IdentityContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = bearer_token(header).ok_or(AuthError::MissingToken)?;

        let identity = AuthService::from_ref(state).verify(token).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            e
        })?;

        Ok(AuthUser(identity))
    }
}

/// Expects "Bearer <token>"; the scheme is matched case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
