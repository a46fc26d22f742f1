//! JSON messages exchanged between `atelier-server` and [`RemoteStore`].
//!
//! [`RemoteStore`]: super::RemoteStore

use serde::{Deserialize, Serialize};

use super::{Document, StoreEvent};

/// Frame pushed over a collection WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    Snapshot { documents: Vec<Document> },
    Error { message: String },
}

impl From<StoreEvent> for ServerEvent {
    fn from(event: StoreEvent) -> Self {
        match event {
            StoreEvent::Snapshot(documents) => ServerEvent::Snapshot { documents },
            StoreEvent::Error(message) => ServerEvent::Error { message },
        }
    }
}

impl From<ServerEvent> for StoreEvent {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Snapshot { documents } => StoreEvent::Snapshot(documents),
            ServerEvent::Error { message } => StoreEvent::Error(message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub email: String,
}

/// Result of `POST /api/collections/{c}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddResponse {
    pub id: String,
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
