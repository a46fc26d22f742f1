//! Session tokens issued by [`LocalAuth`](super::LocalAuth).
//!
//! Tokens live in memory and expire after a configurable time. Unlike a
//! one-shot login link they are checked on every request and only removed on
//! sign-out or expiry.

use rand::Rng;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct TokenEntry {
    email: String,
    expires_at: Instant,
}

/// In-memory token table with expiry.
#[derive(Debug)]
pub struct SessionTokens {
    tokens: RwLock<HashMap<String, TokenEntry>>,
    lifetime: Duration,
}

impl SessionTokens {
    pub fn new(lifetime_minutes: u64) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            lifetime: Duration::from_secs(lifetime_minutes * 60),
        }
    }

    /// Issues a token for `email` (32 bytes, base64url encoded).
    pub fn issue(&self, email: &str) -> String {
        self.issue_with_lifetime(email, self.lifetime)
    }

    pub fn issue_with_lifetime(&self, email: &str, lifetime: Duration) -> String {
        let token = generate_token();
        let entry = TokenEntry {
            email: email.to_string(),
            expires_at: Instant::now() + lifetime,
        };

        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), entry);
        token
    }

    /// Returns the email the token was issued for, if it is known and live.
    /// Expired tokens are dropped on sight.
    pub fn verify(&self, token: &str) -> Option<String> {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        let entry = tokens.get(token)?;

        if Instant::now() > entry.expires_at {
            tokens.remove(token);
            return None;
        }
        Some(entry.email.clone())
    }

    /// Forgets a token. Returns false if it was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    /// Removes all expired tokens and returns how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let before = tokens.len();
        tokens.retain(|_, entry| entry.expires_at > now);
        before - tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionTokens {
    fn default() -> Self {
        Self::new(720)
    }
}

fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_issue_returns_unique_tokens() {
        let tokens = SessionTokens::new(10);

        let a = tokens.issue("a@example.com");
        let b = tokens.issue("a@example.com");

        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_verify_is_repeatable() {
        let tokens = SessionTokens::new(10);
        let token = tokens.issue("admin@example.com");

        assert_eq!(tokens.verify(&token).as_deref(), Some("admin@example.com"));
        assert_eq!(tokens.verify(&token).as_deref(), Some("admin@example.com"));
        assert!(tokens.verify("unknown").is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = SessionTokens::new(10);
        let token = tokens.issue_with_lifetime("admin@example.com", Duration::from_secs(0));

        thread::sleep(Duration::from_millis(10));

        assert!(tokens.verify(&token).is_none());
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_revoke() {
        let tokens = SessionTokens::new(10);
        let token = tokens.issue("admin@example.com");

        assert!(tokens.revoke(&token));
        assert!(!tokens.revoke(&token));
        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn test_cleanup_expired() {
        let tokens = SessionTokens::new(10);
        tokens.issue_with_lifetime("a@example.com", Duration::from_secs(0));
        tokens.issue_with_lifetime("b@example.com", Duration::from_secs(0));
        tokens.issue("c@example.com");

        thread::sleep(Duration::from_millis(10));

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens.cleanup_expired(), 2);
        assert_eq!(tokens.len(), 1);
    }
}
