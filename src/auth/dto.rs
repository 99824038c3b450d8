use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::{
    claims::IdentityContext,
    jwt::IssuedToken,
    repo_types::{Role, UserRecord},
};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
    pub user: PublicUser,
}

impl AuthResponse {
    pub fn bearer(token: IssuedToken, user: PublicUser) -> Self {
        Self {
            expires_in: token.expires_in(),
            access_token: token.token,
            token_type: "bearer",
            user,
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub permissions: BTreeSet<String>,
}

impl From<&UserRecord> for PublicUser {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            name: u.name.clone(),
            role: u.role,
            permissions: u.permissions.clone(),
        }
    }
}

impl From<&IdentityContext> for PublicUser {
    fn from(c: &IdentityContext) -> Self {
        Self {
            id: c.user_id.clone(),
            email: c.email.clone(),
            name: c.name.clone(),
            role: c.role,
            permissions: c.permissions.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
