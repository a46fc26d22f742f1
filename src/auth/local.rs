//! Credential-table auth provider used by `atelier-server`.
//!
//! Admin accounts are read from a YAML file managed by `atelier-admin`:
//!
//! ```yaml
//! admins:
//!   - email: "owner@example.com"
//!     password_sha256: "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{AuthError, AuthProvider, Credentials, Session, SessionTokens};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub email: String,
    pub password_sha256: String,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read '{}': {1}", .0.display())]
    Read(PathBuf, #[source] io::Error),
    #[error("Failed to parse '{}': {1}", .0.display())]
    Parse(PathBuf, #[source] serde_yaml::Error),
    #[error("Failed to write '{}': {1}", .0.display())]
    Write(PathBuf, #[source] io::Error),
    #[error("Failed to serialize admin list: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("Admin '{0}' already exists")]
    Exists(String),
    #[error("Admin '{0}' not found")]
    NotFound(String),
}

/// The set of accounts allowed to sign in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDirectory {
    #[serde(default)]
    pub admins: Vec<AdminAccount>,
}

impl AdminDirectory {
    /// Reads the directory file. A missing file is an empty directory.
    pub fn read(path: &Path) -> Result<Self, DirectoryError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(DirectoryError::Read(path.to_path_buf(), e)),
        };
        serde_yaml::from_str(&contents).map_err(|e| DirectoryError::Parse(path.to_path_buf(), e))
    }

    /// Like [`read`](Self::read), but logs failures and falls back to an
    /// empty directory so the server still starts.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(directory) => {
                tracing::info!("Loaded {} admin account(s)", directory.admins.len());
                if directory.admins.is_empty() {
                    tracing::warn!("No admins configured - every sign-in will fail");
                }
                directory
            }
            Err(e) => {
                tracing::warn!("{}", e);
                tracing::warn!("No admins loaded - every sign-in will fail");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DirectoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DirectoryError::Write(parent.to_path_buf(), e))?;
        }
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents).map_err(|e| DirectoryError::Write(path.to_path_buf(), e))
    }

    pub fn find(&self, email: &str) -> Option<&AdminAccount> {
        let email = email.trim();
        self.admins
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    pub fn verify(&self, email: &str, password: &str) -> bool {
        self.find(email)
            .is_some_and(|a| a.password_sha256.eq_ignore_ascii_case(&hash_password(password)))
    }

    pub fn add(&mut self, email: &str, password: &str) -> Result<(), DirectoryError> {
        if self.find(email).is_some() {
            return Err(DirectoryError::Exists(email.to_string()));
        }
        self.admins.push(AdminAccount {
            email: email.trim().to_string(),
            password_sha256: hash_password(password),
        });
        Ok(())
    }

    pub fn set_password(&mut self, email: &str, password: &str) -> Result<(), DirectoryError> {
        let email = email.trim();
        let account = self
            .admins
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| DirectoryError::NotFound(email.to_string()))?;
        account.password_sha256 = hash_password(password);
        Ok(())
    }

    pub fn remove(&mut self, email: &str) -> Result<(), DirectoryError> {
        let before = self.admins.len();
        self.admins
            .retain(|a| !a.email.eq_ignore_ascii_case(email.trim()));
        if self.admins.len() == before {
            return Err(DirectoryError::NotFound(email.to_string()));
        }
        Ok(())
    }
}

/// Hex SHA-256 of a password, as stored in the directory file.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Auth provider backed by an [`AdminDirectory`] and in-memory tokens.
#[derive(Debug)]
pub struct LocalAuth {
    directory: AdminDirectory,
    tokens: SessionTokens,
}

impl LocalAuth {
    pub fn new(directory: AdminDirectory, session_minutes: u64) -> Self {
        Self {
            directory,
            tokens: SessionTokens::new(session_minutes),
        }
    }

    /// Resolves a bearer token to the admin email it was issued for.
    pub fn authenticate(&self, token: &str) -> Option<String> {
        self.tokens.verify(token)
    }

    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    fn check(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let Some(account) = self.directory.find(&credentials.email) else {
            tracing::info!("Sign-in for unknown admin {}", credentials.email);
            return Err(AuthError::InvalidCredentials);
        };
        if !self.directory.verify(&account.email, &credentials.password) {
            tracing::info!("Wrong password for {}", account.email);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&account.email);
        tracing::info!("Admin {} signed in", account.email);
        Ok(Session {
            email: account.email.clone(),
            token,
        })
    }
}

impl AuthProvider for LocalAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.check(credentials)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        if self.tokens.revoke(&session.token) {
            tracing::info!("Admin {} signed out", session.email);
            Ok(())
        } else {
            Err(AuthError::SignOut("unknown or expired session".to_string()))
        }
    }
}
