use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::auth::AuthConfig;

type Result<T> = anyhow::Result<T>;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Overridden by the DATABASE_URL environment variable when set.
    pub database_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    pub auth: AuthSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSection {
    pub token_secret: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let mut config: ServerConfig =
            toml::from_str(s).context("failed to deserialize server config")?;
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        Ok(config)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            token_secret: self.auth.token_secret.clone(),
            session_ttl_hours: self.auth.session_ttl_hours,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_page_size() -> u64 {
    5
}

fn default_session_ttl_hours() -> i64 {
    24
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;

    #[test]
    fn test_parse_config() {
        let raw = r#"
bind_addr = "0.0.0.0:9000"
database_url = "sqlite::memory:"
page_size = 10

[auth]
token_secret = "not-a-real-secret"
session_ttl_hours = 12
"#;

        let config = ServerConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.auth.token_secret, "not-a-real-secret");
        assert_eq!(config.auth.session_ttl_hours, 12);
    }

    #[test]
    fn test_defaults_apply() {
        let raw = r#"
database_url = "sqlite::memory:"

[auth]
token_secret = "not-a-real-secret"
"#;

        let config = ServerConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.auth.session_ttl_hours, 24);
    }

    #[test]
    fn test_missing_auth_section_rejected() {
        let raw = r#"database_url = "sqlite::memory:""#;
        assert!(ServerConfig::from_str(raw).is_err());
    }
}
