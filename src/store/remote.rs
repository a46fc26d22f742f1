//! Network client for a store hosted by `atelier-server`.
//!
//! Writes go over HTTP; each subscription holds one WebSocket that receives
//! full collection snapshots.

use futures::{SinkExt, StreamExt};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::wire::{AddResponse, ErrorBody, HealthResponse, ServerEvent};
use super::{validate_collection, Document, DocumentStore, Fields, StoreError, StoreEvent, Subscription};
use crate::auth::SessionContext;

/// Store client speaking the `atelier-server` protocol.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    base_url: String,
    http: reqwest::Client,
    session: SessionContext,
}

impl RemoteStore {
    /// Creates an anonymous client. A bare `host:port` is treated as `http://`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http: reqwest::Client::new(),
            session: SessionContext::anonymous(),
        }
    }

    /// Attaches the session whose token authorizes writes and admin reads.
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = session;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}", self.base_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    /// WebSocket URL for a collection subscription.
    fn ws_url(&self, collection: &str) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };

        let url = format!("{}/api/collections/{}/subscribe", base, collection);
        match self.session.token() {
            Some(token) => format!("{}?token={}", url, urlencoding::encode(&token)),
            None => url,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        collection: &str,
        id: Option<&str>,
    ) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StoreError::PermissionDenied(message)
            }
            StatusCode::NOT_FOUND => StoreError::NotFound {
                collection: collection.to_string(),
                id: id.unwrap_or_default().to_string(),
            },
            StatusCode::BAD_REQUEST => StoreError::InvalidCollection(message),
            _ => StoreError::Server(message),
        })
    }

    async fn open_subscription(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_collection(collection)?;

        let url = self.ws_url(collection);
        let stream = connect(&url).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let feeder = tokio::spawn(feed(url, collection.to_string(), stream, tx));

        Ok(Subscription::with_feeder(rx, feeder))
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// First delay before reconnecting a dropped subscription.
const RECONNECT_MIN: Duration = Duration::from_millis(250);
/// Upper bound for the doubling reconnect delay.
const RECONNECT_MAX: Duration = Duration::from_secs(10);

async fn connect(url: &str) -> Result<WsStream, StoreError> {
    let (stream, _) = connect_async(url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;
    Ok(stream)
}

/// How one WebSocket connection ended.
enum FeedEnd {
    /// The subscriber went away.
    Unsubscribed,
    /// The connection dropped; worth another attempt.
    Dropped,
}

/// Forwards snapshots into `tx` and reconnects after every drop until the
/// subscriber goes away. Each drop and each failed attempt is reported as a
/// [`StoreEvent::Error`]; the next snapshot after a reconnect carries on.
async fn feed(
    url: String,
    name: String,
    mut stream: WsStream,
    tx: mpsc::UnboundedSender<StoreEvent>,
) {
    loop {
        if let FeedEnd::Unsubscribed = forward(&name, stream, &tx).await {
            break;
        }

        let mut delay = RECONNECT_MIN;
        stream = loop {
            tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("Subscription to {} finished", name);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(RECONNECT_MAX);

            let attempt = tokio::select! {
                _ = tx.closed() => return,
                attempt = connect(&url) => attempt,
            };
            match attempt {
                Ok(stream) => {
                    tracing::info!("Resubscribed to {}", name);
                    break stream;
                }
                Err(e) => {
                    tracing::warn!("Reconnecting to {} failed: {}", name, e);
                    let message = format!("Reconnecting to {} failed: {}", name, e);
                    if tx.send(StoreEvent::Error(message)).is_err() {
                        return;
                    }
                }
            }
        };
    }

    tracing::debug!("Subscription to {} finished", name);
}

async fn forward(name: &str, stream: WsStream, tx: &mpsc::UnboundedSender<StoreEvent>) -> FeedEnd {
    let (mut sender, mut receiver) = stream.split();

    let end = loop {
        tokio::select! {
            _ = tx.closed() => break FeedEnd::Unsubscribed,
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerEvent>(text.as_str()) {
                        Ok(event) => {
                            if tx.send(event.into()).is_err() {
                                break FeedEnd::Unsubscribed;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Bad frame on {}: {}", name, e);
                            let _ = tx.send(StoreEvent::Error(format!(
                                "Malformed update for {}: {}",
                                name, e
                            )));
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = sender.send(Message::Pong(data)).await {
                        let _ = tx.send(StoreEvent::Error(e.to_string()));
                        break FeedEnd::Dropped;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    let _ = tx.send(StoreEvent::Error(format!(
                        "Subscription to {} closed by server",
                        name
                    )));
                    break FeedEnd::Dropped;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = tx.send(StoreEvent::Error(e.to_string()));
                    break FeedEnd::Dropped;
                }
            }
        }
    };

    let _ = sender.send(Message::Close(None)).await;
    end
}

impl DocumentStore for RemoteStore {
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.open_subscription(collection).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        validate_collection(collection)?;
        let request = self.http.get(self.collection_url(collection));
        self.send(request, collection, None)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Server(e.to_string()))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        validate_collection(collection)?;
        let request = self.http.post(self.collection_url(collection)).json(&fields);
        let body: AddResponse = self
            .send(request, collection, None)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Server(e.to_string()))?;
        Ok(body.id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        validate_collection(collection)?;
        let request = self.http.put(self.document_url(collection, id)).json(&fields);
        self.send(request, collection, Some(id)).await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        validate_collection(collection)?;
        let request = self.http.patch(self.document_url(collection, id)).json(&fields);
        self.send(request, collection, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        validate_collection(collection)?;
        let request = self.http.delete(self.document_url(collection, id));
        match self.send(request, collection, Some(id)).await {
            Ok(_) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else {
        format!("http://{}", url)
    }
}

/// Returns true when `/health` answers with status `ok`.
pub async fn check_server(base_url: &str) -> bool {
    let url = format!("{}/health", normalize_base_url(base_url));
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => response
            .json::<HealthResponse>()
            .await
            .map(|h| h.status == "ok")
            .unwrap_or(false),
        _ => false,
    }
}
