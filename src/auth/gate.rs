use tokio::sync::watch;

use super::{AuthError, AuthProvider, Credentials, Session};
use crate::notify::Notifier;

/// Read-only view of the current session, handed to every component that
/// needs to know whether the viewer is an admin.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<Option<Session>>,
}

impl SessionContext {
    /// A context that never has a session.
    pub fn anonymous() -> Self {
        Self::fixed(None)
    }

    /// A context pinned to `session`, for callers without a gate.
    pub fn fixed(session: Option<Session>) -> Self {
        let (_tx, rx) = watch::channel(session);
        Self { rx }
    }

    pub fn is_admin(&self) -> bool {
        self.rx.borrow().is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.rx.borrow().clone()
    }

    pub fn email(&self) -> Option<String> {
        self.rx.borrow().as_ref().map(|s| s.email.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.rx.borrow().as_ref().map(|s| s.token.clone())
    }

    /// Waits for the next sign-in or sign-out. Returns false once the gate
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Owns the session flag. Only the gate changes it.
#[derive(Debug)]
pub struct AuthGate<P> {
    provider: P,
    state: watch::Sender<Option<Session>>,
    notifier: Notifier,
}

impl<P: AuthProvider> AuthGate<P> {
    pub fn new(provider: P, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            provider,
            state,
            notifier,
        }
    }

    /// Resumes a session persisted by an earlier run.
    pub fn restore(&self, session: Session) {
        tracing::debug!("Restored session for {}", session.email);
        self.state.send_replace(Some(session));
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            rx: self.state.subscribe(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            let err = AuthError::MissingCredentials;
            self.notifier.error("Sign-in failed", err.to_string());
            return Err(err);
        }

        let credentials = Credentials::new(email, password);
        match self.provider.sign_in(&credentials).await {
            Ok(session) => {
                self.state.send_replace(Some(session.clone()));
                self.notifier
                    .success("Signed in", format!("Welcome, {}", session.email));
                Ok(session)
            }
            Err(e) => {
                self.notifier.error("Sign-in failed", e.to_string());
                Err(e)
            }
        }
    }

    /// Ends the session. Local state is cleared even when the provider fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.state.send_replace(None) else {
            return Ok(());
        };

        match self.provider.sign_out(&session).await {
            Ok(()) => {
                self.notifier.info("Signed out", session.email);
                Ok(())
            }
            Err(e) => {
                self.notifier.warning("Sign-out incomplete", e.to_string());
                Err(e)
            }
        }
    }
}
