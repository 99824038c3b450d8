use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::{errors::AuthError, repo_types::Role};

/// JWT payload used for authentication. Every field is required; a token
/// missing any of them fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,                  // user ID
    pub email: String,
    pub name: String,
    pub role: Role,
    pub permissions: BTreeSet<String>,
    pub iat: usize,                   // issued at (unix timestamp)
    pub exp: usize,                   // expires at (unix timestamp)
    pub iss: String,                  // issuer
    pub aud: String,                  // audience
}

/// Verified caller identity handed to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub permissions: BTreeSet<String>,
    pub issued_at: usize,
    pub expires_at: usize,
}

impl From<Claims> for IdentityContext {
    fn from(c: Claims) -> Self {
        Self {
            user_id: c.sub,
            email: c.email,
            name: c.name,
            role: c.role,
            permissions: c.permissions,
            issued_at: c.iat,
            expires_at: c.exp,
        }
    }
}

impl IdentityContext {
    /// Coarse allow-list check: the caller's role must be one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}
