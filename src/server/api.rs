//! JSON and WebSocket endpoints of the hosted store.
//!
//! Read rule: every collection is public except `contacts`. Write rule:
//! admins only, except that anyone may add a contact request.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{bearer_token, AppState};
use crate::admin::{submit_contact, AdminError, NewContact};
use crate::auth::{AuthError, AuthProvider, Credentials, Session, SessionContext};
use crate::models::collections;
use crate::notify::Notifier;
use crate::store::wire::{AddResponse, ErrorBody, HealthResponse, ServerEvent, SignInRequest, SignInResponse};
use crate::store::{validate_collection, Document, DocumentStore, Fields, StoreError, Subscription};

/// Error response: `{error, message}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::InvalidCollection(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_collection", e.to_string())
            }
            StoreError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "not_found", e.to_string()),
            StoreError::PermissionDenied(_) => Self::unauthorized(e.to_string()),
            _ => {
                tracing::error!("Store failure: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
            }
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(e: AdminError) -> Self {
        match e {
            AdminError::Validation(v) => {
                Self::new(StatusCode::BAD_REQUEST, "validation_error", v.to_string())
            }
            AdminError::NotAuthorized => Self::unauthorized("Admin session required"),
            AdminError::Upload(u) => {
                Self::new(StatusCode::BAD_REQUEST, "upload_error", u.to_string())
            }
            AdminError::Store(s) => s.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.error.to_string(),
                message: self.message,
            }),
        )
            .into_response()
    }
}

fn can_read(collection: &str, session: &SessionContext) -> bool {
    collections::is_public(collection) || session.is_admin()
}

fn require_admin(session: &SessionContext) -> Result<(), ApiError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(ApiError::unauthorized("Admin session required"))
    }
}

/// Health check endpoint (no auth required)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::version().to_string(),
    })
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let credentials = Credentials::new(request.email, request.password);
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "missing_credentials",
            AuthError::MissingCredentials.to_string(),
        ));
    }

    match state.auth.sign_in(&credentials).await {
        Ok(session) => Ok(Json(SignInResponse {
            token: session.token,
            email: session.email,
        })),
        Err(AuthError::InvalidCredentials) => {
            Err(ApiError::unauthorized(AuthError::InvalidCredentials.to_string()))
        }
        Err(e) => Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "auth_failed",
            e.to_string(),
        )),
    }
}

pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Bearer token required"))?;
    let email = state
        .auth
        .authenticate(token)
        .ok_or_else(|| ApiError::unauthorized("Unknown or expired session"))?;

    let session = Session {
        email,
        token: token.to_string(),
    };
    state
        .auth
        .sign_out(&session)
        .await
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, ApiError> {
    validate_collection(&collection)?;
    let session = state.session_for(bearer_token(&headers));
    if !can_read(&collection, &session) {
        return Err(ApiError::unauthorized(format!(
            "Reading {} requires an admin session",
            collection
        )));
    }
    Ok(Json(state.store.list(&collection).await?))
}

fn text_field(fields: &Fields, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub async fn add(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> Result<(StatusCode, Json<AddResponse>), ApiError> {
    validate_collection(&collection)?;
    let session = state.session_for(bearer_token(&headers));

    let id = if collection == collections::CONTACTS && !session.is_admin() {
        let request = NewContact {
            name: text_field(&fields, "name"),
            email: text_field(&fields, "email"),
            phone: text_field(&fields, "phone"),
            service: text_field(&fields, "service"),
            message: text_field(&fields, "message"),
        };
        submit_contact(&state.store, &request, &Notifier::silent()).await?
    } else {
        require_admin(&session)?;
        state.store.add(&collection, fields).await?
    };

    Ok((StatusCode::CREATED, Json(AddResponse { id })))
}

pub async fn set(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> Result<StatusCode, ApiError> {
    validate_collection(&collection)?;
    require_admin(&state.session_for(bearer_token(&headers)))?;
    state.store.set(&collection, &id, fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> Result<StatusCode, ApiError> {
    validate_collection(&collection)?;
    require_admin(&state.session_for(bearer_token(&headers)))?;
    state.store.update(&collection, &id, fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    validate_collection(&collection)?;
    require_admin(&state.session_for(bearer_token(&headers)))?;
    state.store.delete(&collection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    token: Option<String>,
}

pub async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<SubscribeQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    validate_collection(&collection)?;
    let token = query.token.as_deref().or_else(|| bearer_token(&headers));
    let session = state.session_for(token);
    if !can_read(&collection, &session) {
        return Err(ApiError::unauthorized(format!(
            "Subscribing to {} requires an admin session",
            collection
        )));
    }

    let subscription = state.store.subscribe(&collection).await?;
    tracing::debug!("Subscriber attached to {}", collection);
    Ok(ws.on_upgrade(move |socket| forward(socket, subscription, collection)))
}

/// Pushes every store event to the socket until either side goes away.
async fn forward(mut socket: WebSocket, mut subscription: Subscription, collection: String) {
    loop {
        tokio::select! {
            event = subscription.next() => {
                let Some(event) = event else { break };
                let frame = match serde_json::to_string(&ServerEvent::from(event)) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("Failed to encode {} event: {}", collection, e);
                        continue;
                    }
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    tracing::debug!("Subscriber left {}", collection);
}
