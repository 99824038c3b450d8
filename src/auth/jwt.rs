use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{claims::Claims, errors::AuthError, repo_types::UserRecord},
    config::JwtConfig,
};

/// A freshly signed token with its validity window (unix seconds).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: usize,
    pub expires_at: usize,
}

impl IssuedToken {
    pub fn expires_in(&self) -> usize {
        self.expires_at.saturating_sub(self.issued_at)
    }
}

/// HS256 signing and verification keys with issuer/audience/ttl.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64).saturating_mul(60)),
        }
    }

    /// Signs a token for `user`, valid from `now` for the configured ttl.
    pub fn sign_at(&self, user: &UserRecord, now: OffsetDateTime) -> anyhow::Result<IssuedToken> {
        let ttl = TimeDuration::try_from(self.ttl)?;
        let exp = now
            .checked_add(ttl)
            .ok_or_else(|| anyhow::anyhow!("token expiry out of range (ttl {}s)", self.ttl.as_secs()))?;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            permissions: user.permissions.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user.id, exp = claims.exp, "jwt signed");
        Ok(IssuedToken {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    pub fn sign(&self, user: &UserRecord) -> anyhow::Result<IssuedToken> {
        self.sign_at(user, OffsetDateTime::now_utc())
    }

    /// Checks signature, algorithm, issuer, audience and expiry.
    ///
    /// A token is expired once `now >= exp`; no leeway is granted.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            }
        })?;

        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        if now >= data.claims.exp {
            return Err(AuthError::TokenExpired);
        }
        debug!(user_id = %data.claims.sub, role = %data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}
