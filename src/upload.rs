//! Client for the external image host.
//!
//! The host takes a multipart `image` part plus an API key and answers
//! `{ "data": { "url": ... } }` on success or `{ "error": { "message": ... } }`.
//! Anything without a URL is a failure.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Image upload is not configured: set upload_api_key")]
    NotConfigured,
    #[error("Failed to read image '{0}': {1}")]
    Read(String, String),
    #[error("Upload request failed: {0}")]
    Http(String),
    #[error("Image host rejected the upload: {0}")]
    Rejected(String),
    #[error("Image host did not return a URL")]
    MissingUrl,
}

/// Raw image bytes to upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = std::fs::read(path)
            .map_err(|e| UploadError::Read(path.display().to_string(), e.to_string()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { filename, bytes })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
    error: Option<UploadFailure>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadFailure {
    message: Option<String>,
}

/// Extracts the hosted URL from a response body.
pub fn interpret(body: &str) -> Result<String, UploadError> {
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|_| UploadError::MissingUrl)?;

    if let Some(url) = response
        .data
        .and_then(|d| d.url)
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
    {
        return Ok(url);
    }

    match response.error.and_then(|e| e.message) {
        Some(message) => Err(UploadError::Rejected(message)),
        None => Err(UploadError::MissingUrl),
    }
}

#[derive(Debug, Clone)]
pub struct ImageHost {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl ImageHost {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fails with [`UploadError::NotConfigured`] when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self, UploadError> {
        let key = config.upload_api_key().ok_or(UploadError::NotConfigured)?;
        Ok(Self::new(config.upload_endpoint.clone(), key))
    }

    /// Uploads the image and returns its public URL.
    pub async fn upload(&self, image: &ImageUpload) -> Result<String, UploadError> {
        let part = Part::bytes(image.bytes.clone()).file_name(image.filename.clone());
        let form = Form::new().part("image", part);

        tracing::info!("Uploading {} ({} bytes)", image.filename, image.bytes.len());

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        match interpret(&body) {
            Err(UploadError::MissingUrl) if !status.is_success() => {
                Err(UploadError::Rejected(status.to_string()))
            }
            other => other,
        }
    }
}
