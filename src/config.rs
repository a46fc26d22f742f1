//! Configuration for the CLI client and the server.
//!
//! Priority for both: environment variables > config file > defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::auth::Session;

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Project id shipped in sample configs. A store with this id is treated as
/// not configured.
pub const PLACEHOLDER_PROJECT_ID: &str = "demo-project";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the hosted store
    pub store_url: Option<String>,
    /// Project the store belongs to
    pub project_id: Option<String>,
    /// API key for the image host
    pub upload_api_key: Option<String>,
    pub upload_endpoint: String,
    /// Where the signed-in session is kept between runs
    pub session_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            project_id: None,
            upload_api_key: None,
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            session_path: config_dir().join("session.yaml"),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(Self::default_config_path);
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads `path`, or returns defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Applies `ATELIER_*` overrides looked up through `var`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("ATELIER_STORE_URL") {
            self.store_url = Some(url);
        }
        if let Some(project) = var("ATELIER_PROJECT_ID") {
            self.project_id = Some(project);
        }
        if let Some(key) = var("ATELIER_UPLOAD_API_KEY") {
            self.upload_api_key = Some(key);
        }
        if let Some(endpoint) = var("ATELIER_UPLOAD_ENDPOINT") {
            self.upload_endpoint = endpoint;
        }
    }

    /// Default config file path: ~/.config/atelier/config.yaml
    pub fn default_config_path() -> PathBuf {
        config_dir().join("config.yaml")
    }

    /// The store URL, if a real store is configured.
    pub fn store_url(&self) -> Option<&str> {
        let url = self.store_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        match self.project_id.as_deref() {
            Some(PLACEHOLDER_PROJECT_ID) => None,
            _ => Some(url),
        }
    }

    pub fn is_store_configured(&self) -> bool {
        self.store_url().is_some()
    }

    pub fn upload_api_key(&self) -> Option<&str> {
        self.upload_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// The session saved by the last `login`, if any.
    pub fn load_session(&self) -> Result<Option<Session>, ConfigError> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.session_path)
            .map_err(|e| ConfigError::Read(self.session_path.clone(), e))?;
        serde_yaml::from_str(&contents)
            .map(Some)
            .map_err(|e| ConfigError::Parse(self.session_path.clone(), e))
    }

    pub fn save_session(&self, session: &Session) -> Result<(), ConfigError> {
        if let Some(parent) = self.session_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Write(parent.to_path_buf(), e))?;
        }
        let contents = serde_yaml::to_string(session).map_err(ConfigError::Serialize)?;
        std::fs::write(&self.session_path, contents)
            .map_err(|e| ConfigError::Write(self.session_path.clone(), e))
    }

    pub fn clear_session(&self) -> Result<(), ConfigError> {
        match std::fs::remove_file(&self.session_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConfigError::Write(self.session_path.clone(), e)),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atelier")
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Directory holding one JSON file per collection
    pub data_dir: PathBuf,
    /// YAML file with the admin accounts
    pub config_path: PathBuf,
    /// Lifetime of a sign-in
    pub session_minutes: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("ATELIER_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let data_dir = var("ATELIER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("atelier-server")
            });

        let config_path = var("ATELIER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("atelier-server")
                    .join("config.yaml")
            });

        let session_minutes = var("ATELIER_SESSION_MINUTES")
            .and_then(|m| m.parse().ok())
            .unwrap_or(720);

        Self {
            port,
            data_dir,
            config_path,
            session_minutes,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {1}", .0.display())]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config file '{}': {1}", .0.display())]
    Parse(PathBuf, #[source] serde_yaml::Error),
    #[error("Failed to write '{}': {1}", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
    #[error("Failed to serialize: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("{0} is not configured")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upload_endpoint, DEFAULT_UPLOAD_ENDPOINT);
        assert!(config.session_path.to_string_lossy().contains("atelier"));
        assert!(!config.is_store_configured());
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = Config::from_file(&temp_dir.path().join("nonexistent.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "store_url: http://localhost:8080").unwrap();
        writeln!(file, "project_id: studio").unwrap();
        writeln!(file, "upload_api_key: abc").unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.store_url(), Some("http://localhost:8080"));
        assert_eq!(config.upload_api_key(), Some("abc"));
        assert_eq!(config.upload_endpoint, DEFAULT_UPLOAD_ENDPOINT);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            store_url: Some("http://from-file".to_string()),
            ..Config::default()
        };

        config.apply_overrides(env(&[
            ("ATELIER_STORE_URL", "http://from-env"),
            ("ATELIER_UPLOAD_ENDPOINT", "http://images.local/upload"),
        ]));

        assert_eq!(config.store_url(), Some("http://from-env"));
        assert_eq!(config.upload_endpoint, "http://images.local/upload");
    }

    #[test]
    fn test_placeholder_project_is_not_configured() {
        let config = Config {
            store_url: Some("http://localhost:8080".to_string()),
            project_id: Some(PLACEHOLDER_PROJECT_ID.to_string()),
            ..Config::default()
        };
        assert!(!config.is_store_configured());

        let blank = Config {
            store_url: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(!blank.is_store_configured());
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "invalid: yaml: content: [").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_session_round_trip() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            session_path: temp_dir.path().join("nested").join("session.yaml"),
            ..Config::default()
        };
        assert!(config.load_session().unwrap().is_none());

        let session = Session {
            email: "admin@example.com".to_string(),
            token: "tok".to_string(),
        };
        config.save_session(&session).unwrap();
        assert_eq!(config.load_session().unwrap(), Some(session));

        config.clear_session().unwrap();
        config.clear_session().unwrap();
        assert!(config.load_session().unwrap().is_none());
    }

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(env(&[
            ("ATELIER_PORT", "9000"),
            ("ATELIER_DATA_DIR", "/srv/atelier"),
            ("ATELIER_SESSION_MINUTES", "not-a-number"),
        ]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/srv/atelier"));
        assert_eq!(config.session_minutes, 720);
        assert!(config.config_path.ends_with("config.yaml"));
    }
}
