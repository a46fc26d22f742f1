//! Authentication: the provider seam, the gate that owns the session flag,
//! and the two providers shipped with the crate.
//!
//! There is exactly one role. A viewer is an admin when a session exists.

mod gate;
mod local;
mod remote;
mod tokens;

pub use gate::{AuthGate, SessionContext};
pub use local::{hash_password, AdminAccount, AdminDirectory, DirectoryError, LocalAuth};
pub use remote::RemoteAuth;
pub use tokens::SessionTokens;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// An authenticated admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub token: String,
}

/// Email and password as typed on the login form.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Auth provider unavailable: {0}")]
    Unavailable(String),
    #[error("Sign-out failed: {0}")]
    SignOut(String),
}

/// The external identity provider.
pub trait AuthProvider: Send + Sync + 'static {
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    fn sign_out(&self, session: &Session) -> impl Future<Output = Result<(), AuthError>> + Send;
}

impl<P: AuthProvider> AuthProvider for Arc<P> {
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send {
        (**self).sign_in(credentials)
    }

    fn sign_out(&self, session: &Session) -> impl Future<Output = Result<(), AuthError>> + Send {
        (**self).sign_out(session)
    }
}
