use std::sync::Arc;

use anyhow::Context;

use crate::auth::{jwt::JwtKeys, repo::CredentialStore, services::AuthService};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.users_file {
            Some(path) => CredentialStore::from_json_file(path)
                .with_context(|| format!("load credential table {}", path.display()))?,
            None => {
                tracing::warn!("USERS_FILE not set; using built-in demo users");
                CredentialStore::demo().context("build demo credential table")?
            }
        };

        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: CredentialStore) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        let auth = AuthService::new(Arc::new(store), keys);
        Self { config, auth }
    }

    /// Fixed secret and the demo users; for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, DEFAULT_TTL_MINUTES};

        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: DEFAULT_TTL_MINUTES,
            },
            users_file: None,
            host: "127.0.0.1".into(),
            port: 0,
        });
        let store = CredentialStore::demo().expect("demo store builds");
        Self::from_parts(config, store)
    }
}
