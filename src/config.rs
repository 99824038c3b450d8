use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24;
/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.secret.is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(
            (1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes),
            "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {}",
            self.ttl_minutes
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    /// JSON credential table; the built-in demo users are used when unset.
    pub users_file: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hudur".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "hudur-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_TTL_MINUTES),
        };
        jwt.validate()?;

        let users_file = std::env::var("USERS_FILE").ok().map(PathBuf::from);
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse().with_context(|| format!("APP_PORT is not a port: {v}"))?,
            Err(_) => 8080,
        };
        Ok(Self {
            jwt,
            users_file,
            host,
            port,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(ttl_minutes: i64) -> JwtConfig {
        JwtConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes,
        }
    }

    #[test]
    fn ttl_must_be_within_bounds() {
        assert!(jwt(1).validate().is_ok());
        assert!(jwt(DEFAULT_TTL_MINUTES).validate().is_ok());
        assert!(jwt(MAX_TTL_MINUTES).validate().is_ok());
        assert!(jwt(0).validate().is_err());
        assert!(jwt(-5).validate().is_err());
        assert!(jwt(MAX_TTL_MINUTES + 1).validate().is_err());
        assert!(jwt(i64::MAX).validate().is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut cfg = jwt(60);
        cfg.secret.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn listen_addr_from_host_and_port() {
        let cfg = AppConfig {
            jwt: jwt(60),
            users_file: None,
            host: "127.0.0.1".into(),
            port: 9090,
        };
        assert_eq!(cfg.listen_addr().unwrap(), "127.0.0.1:9090".parse().unwrap());

        let bad = AppConfig {
            host: "not a host".into(),
            ..cfg
        };
        assert!(bad.listen_addr().is_err());
    }
}
