//! Input validation shared by editable fields and admin editors.
//!
//! Everything here runs before any store call; a failed check leaves no
//! partial state behind.

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be an absolute http(s) URL, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
    #[error("Unknown icon '{0}'")]
    UnknownIcon(String),
    #[error("Provide either an image upload or an image URL, not both")]
    AmbiguousImage,
    #[error("An image upload or an image URL is required")]
    MissingImage,
}

/// Returns the trimmed value, or an error when it is blank.
pub fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

/// Like [`require`], but passes `None` through untouched.
pub fn require_if_present(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    value.map(|v| require(field, v)).transpose()
}

/// Requires an absolute `http` or `https` URL with a host.
pub fn require_url(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = require(field, value)?;
    let invalid = || ValidationError::InvalidUrl {
        field,
        value: value.clone(),
    };

    let url = Url::parse(&value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(value)
}

/// Minimal email shape check: a local part and a dotted domain.
pub fn require_email(value: &str) -> Result<String, ValidationError> {
    let value = require("Email", value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .filter(|part| !part.is_empty())
                    .count()
                    >= 2
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(value)
    } else {
        Err(ValidationError::InvalidEmail(value))
    }
}
