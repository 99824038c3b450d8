use std::sync::Arc;

use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::IdentityContext,
        dto::PublicUser,
        errors::AuthError,
        jwt::{IssuedToken, JwtKeys},
        password::verify_password,
        repo::CredentialStore,
    },
    state::AppState,
};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: PublicUser,
}

/// Login, token verification and refresh over an injected credential store.
///
/// Holds no mutable state; clones share the same store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<CredentialStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<CredentialStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    #[cfg(test)]
    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown email and wrong password return the same error, and both
    /// pay for one password verification.
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }

        let Some(user) = self.store.find_by_email(email) else {
            let _ = verify_password(password, self.store.decoy_hash());
            warn!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.sign(user)?;
        info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(LoginOutcome {
            token,
            user: PublicUser::from(user),
        })
    }

    pub fn verify(&self, token: &str) -> Result<IdentityContext, AuthError> {
        self.keys.verify(token).map(IdentityContext::from)
    }

    /// Re-issues a token for an already verified caller.
    ///
    /// Claims are rebuilt from the current credential table. Token times have
    /// one-second resolution, so the new `iat` is pushed past the old one to
    /// keep the new `exp` strictly later.
    pub fn refresh(&self, identity: &IdentityContext) -> Result<IssuedToken, AuthError> {
        let user = self
            .store
            .find_by_email(&identity.email)
            .filter(|u| u.id == identity.user_id)
            .ok_or_else(|| {
                warn!(user_id = %identity.user_id, "refresh for user no longer in table");
                AuthError::TokenInvalid
            })?;

        let mut now = OffsetDateTime::now_utc();
        let floor = identity.issued_at as i64 + 1;
        if now.unix_timestamp() < floor {
            now = OffsetDateTime::from_unix_timestamp(floor)
                .map_err(|e| AuthError::Internal(e.into()))?;
        }
        let token = self.keys.sign_at(user, now)?;
        info!(user_id = %user.id, exp = token.expires_at, "token refreshed");
        Ok(token)
    }

    /// Nothing is revoked server side; the token stays valid until it expires.
    pub fn logout(&self, identity: Option<&IdentityContext>) {
        match identity {
            Some(id) => info!(user_id = %id.user_id, "logout requested"),
            None => info!("logout requested without a valid token"),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
