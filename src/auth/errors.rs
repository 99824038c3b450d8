use std::path::PathBuf;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failure kinds of the auth flow. Each maps to exactly one HTTP status.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    /// Unknown email and wrong password both end up here.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing or malformed Authorization header")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token")]
    TokenInvalid,

    #[error("insufficient permissions")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::InvalidCredentials => "Invalid email or password".into(),
            AuthError::MissingToken => "Missing or malformed Authorization header".into(),
            AuthError::TokenExpired => "Token has expired".into(),
            AuthError::TokenInvalid => "Invalid token".into(),
            AuthError::Forbidden => "Insufficient permissions".into(),
            AuthError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(e) = &self {
            error!(error = %e, "request failed with internal error");
        }
        let status = self.status();
        let mut res = (status, self.public_message()).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        res
    }
}

/// Problems building the credential table at startup.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read credential table {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse credential table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate email in credential table: {0}")]
    DuplicateEmail(String),

    #[error("invalid email in credential table: {0}")]
    InvalidEmail(String),

    #[error("user {0} has an empty id")]
    MissingId(String),

    #[error("user {0} has a password_hash that is not a PHC string")]
    InvalidHash(String),

    #[error("hash password: {0}")]
    Hash(anyhow::Error),
}
