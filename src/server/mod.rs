//! HTTP and WebSocket host for the document store and the two pages.
//!
//! Collections live in a [`MemoryStore`] persisted to the data directory.
//! Admins are the accounts of an [`crate::auth::AdminDirectory`]; a sign-in
//! hands out a bearer token that the API accepts in the `Authorization`
//! header, the `token` query parameter (WebSocket) or the session cookie
//! (pages).

pub mod api;
pub mod pages;

use axum::http::{header, HeaderMap};
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{LocalAuth, Session, SessionContext};
use crate::notify::Notifier;
use crate::site::Site;
use crate::store::{MemoryStore, StoreError};

/// Cookie carrying the session token for page requests.
pub const SESSION_COOKIE: &str = "atelier_session";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: MemoryStore,
    pub auth: Arc<LocalAuth>,
    pub site: Arc<Site<MemoryStore>>,
}

impl AppState {
    pub async fn new(store: MemoryStore, auth: LocalAuth) -> Result<Self, StoreError> {
        let site = Site::open(store.clone(), Notifier::silent()).await?;
        Ok(Self {
            store,
            auth: Arc::new(auth),
            site: Arc::new(site),
        })
    }

    /// Session for a request token. Unknown or expired tokens are anonymous.
    pub fn session_for(&self, token: Option<&str>) -> SessionContext {
        let session = token.and_then(|token| {
            self.auth.authenticate(token).map(|email| Session {
                email,
                token: token.to_string(),
            })
        });
        SessionContext::fixed(session)
    }
}

/// Token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Value of cookie `name`.
pub fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/auth/sign-in", post(api::sign_in))
        .route("/api/auth/sign-out", post(api::sign_out))
        .route(
            "/api/collections/{collection}",
            get(api::list).post(api::add),
        )
        .route(
            "/api/collections/{collection}/subscribe",
            get(api::subscribe),
        )
        .route(
            "/api/collections/{collection}/{id}",
            put(api::set).patch(api::update).delete(api::remove),
        )
        .route("/", get(pages::home))
        .route("/admin", get(pages::admin))
        .route("/login", post(pages::login))
        .route("/logout", post(pages::logout))
        .fallback(pages::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; atelier_session=tok123"),
        );
        assert_eq!(cookie(&headers, SESSION_COOKIE), Some("tok123"));
        assert_eq!(cookie(&headers, "missing"), None);
    }
}
