use reqwest::StatusCode;

use super::{AuthError, AuthProvider, Credentials, Session};
use crate::store::remote::normalize_base_url;
use crate::store::wire::{SignInRequest, SignInResponse};

/// Auth provider talking to `atelier-server`.
#[derive(Debug, Clone)]
pub struct RemoteAuth {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteAuth {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/auth/{}", self.base_url, path)
    }
}

impl AuthProvider for RemoteAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let body = SignInRequest {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        };

        let response = self
            .http
            .post(self.url("sign-in"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidCredentials),
            status if !status.is_success() => Err(AuthError::Unavailable(status.to_string())),
            _ => {
                let session: SignInResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Unavailable(e.to_string()))?;
                Ok(Session {
                    email: session.email,
                    token: session.token,
                })
            }
        }
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url("sign-out"))
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| AuthError::SignOut(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::SignOut(response.status().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let auth = RemoteAuth::new("localhost:8080/");
        assert_eq!(auth.url("sign-in"), "http://localhost:8080/api/auth/sign-in");
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let auth = RemoteAuth::new("http://127.0.0.1:9");
        let err = auth
            .sign_in(&Credentials::new("a@example.com", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }
}
