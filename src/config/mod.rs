//! Configuration loading and management
//!
//! Settings come from an optional YAML file (path in `NATURE_NOTES_CONFIG`)
//! and are then overridden by environment variables. Every section has
//! defaults, so an empty file is a valid config for local development.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Startup configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Minimum session secret length in bytes
pub const MIN_SECRET_LEN: usize = 16;

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,

    /// Google sign-in; `/login` answers 503 without it
    pub oauth: Option<OAuthConfig>,

    pub cors: CorsConfig,
}

/// Listen address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which DocumentStore implementation to run against
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongodb,
    /// Process-local, lost on restart
    #[default]
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::Mongodb),
            "memory" | "in_memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "unknown store backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Connection string, required for mongodb
    pub uri: Option<String>,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            uri: None,
            database: "nature_notes".to_string(),
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie signing secret
    pub secret: String,
    pub cookie_name: String,
    /// Adds the `Secure` cookie attribute
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_name: "nature_notes.sid".to_string(),
            secure: false,
        }
    }
}

/// Google OAuth client registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// File (if any), then environment, then validation
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var("NATURE_NOTES_CONFIG") {
            Ok(path) => {
                tracing::debug!(path = %path, "loading config file");
                Self::from_yaml_file(path)?
            }
            Err(_) => Self::default(),
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply process environment variables
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT '{}' is not a port", port)))?;
        }

        if let Some(uri) = lookup("MONGODB_URI") {
            self.store.uri = Some(uri);
        }
        if let Some(database) = lookup("MONGODB_DATABASE") {
            self.store.database = database;
        }
        match lookup("STORE_BACKEND") {
            Some(backend) => self.store.backend = backend.parse()?,
            None if lookup("MONGODB_URI").is_some() => self.store.backend = StoreBackend::Mongodb,
            None => {}
        }

        if let Some(secret) = lookup("SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Some(secure) = lookup("SESSION_COOKIE_SECURE") {
            self.session.secure = parse_flag(&secure)?;
        }

        if let (Some(client_id), Some(client_secret), Some(callback_url)) = (
            lookup("GOOGLE_CLIENT_ID"),
            lookup("GOOGLE_CLIENT_SECRET"),
            lookup("GOOGLE_CALLBACK_URL"),
        ) {
            self.oauth = Some(OAuthConfig {
                client_id,
                client_secret,
                callback_url,
            });
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(self)
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Mongodb
            && self.store.uri.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::Missing("MONGODB_URI (store.uri)"));
        }

        if self.session.secret.is_empty() {
            return Err(ConfigError::Missing("SESSION_SECRET (session.secret)"));
        }
        if self.session.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "session secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        if let Some(oauth) = &self.oauth {
            for (name, value) in [
                ("client_id", &oauth.client_id),
                ("client_secret", &oauth.client_secret),
                ("callback_url", &oauth.callback_url),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!("oauth.{} is empty", name)));
                }
            }
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("'{}' is not a boolean", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.database, "nature_notes");
        assert_eq!(config.session.cookie_name, "nature_notes.sid");
        assert!(config.oauth.is_none());
    }

    #[test]
    fn test_yaml_partial_sections_keep_defaults() {
        let yaml = r#"
server:
  port: 8080
store:
  backend: mongodb
  uri: mongodb://localhost:27017
session:
  secret: "0123456789abcdef"
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.store.database, "nature_notes");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let err = AppConfig::from_yaml_str("server: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  port: 4000\n").unwrap();
        let config = AppConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.server.port, 4000);

        let err = AppConfig::from_yaml_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_overrides_from(env(&[
                ("PORT", "8081"),
                ("MONGODB_URI", "mongodb://db:27017"),
                ("SESSION_SECRET", "a-long-enough-secret"),
                ("SESSION_COOKIE_SECURE", "true"),
                ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.store.uri.as_deref(), Some("mongodb://db:27017"));
        assert!(config.session.secure);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_backend_wins_over_uri() {
        let config = AppConfig::default()
            .with_overrides_from(env(&[
                ("MONGODB_URI", "mongodb://db:27017"),
                ("STORE_BACKEND", "memory"),
            ]))
            .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_oauth_needs_all_three_variables() {
        let partial = AppConfig::default()
            .with_overrides_from(env(&[("GOOGLE_CLIENT_ID", "id")]))
            .unwrap();
        assert!(partial.oauth.is_none());

        let full = AppConfig::default()
            .with_overrides_from(env(&[
                ("GOOGLE_CLIENT_ID", "id"),
                ("GOOGLE_CLIENT_SECRET", "secret"),
                ("GOOGLE_CALLBACK_URL", "http://localhost:3000/auth/google/callback"),
            ]))
            .unwrap();
        assert_eq!(full.oauth.unwrap().client_id, "id");
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(
            AppConfig::default()
                .with_overrides_from(env(&[("PORT", "eighty")]))
                .is_err()
        );
        assert!(
            AppConfig::default()
                .with_overrides_from(env(&[("STORE_BACKEND", "sqlite")]))
                .is_err()
        );
        assert!(
            AppConfig::default()
                .with_overrides_from(env(&[("SESSION_COOKIE_SECURE", "maybe")]))
                .is_err()
        );
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));

        config.session.secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.session.secret = "0123456789abcdef".to_string();
        assert!(config.validate().is_ok());

        config.store.backend = StoreBackend::Mongodb;
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
        config.store.uri = Some("mongodb://localhost".to_string());
        assert!(config.validate().is_ok());

        config.oauth = Some(OAuthConfig {
            client_id: "id".to_string(),
            client_secret: " ".to_string(),
            callback_url: "http://x".to_string(),
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
