use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{collections, Record};

/// Where a contact request stands. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactStatus::New => write!(f, "new"),
            ContactStatus::InProgress => write!(f, "in-progress"),
            ContactStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(ContactStatus::New),
            "in-progress" | "in_progress" => Ok(ContactStatus::InProgress),
            "completed" => Ok(ContactStatus::Completed),
            _ => Err(format!(
                "Invalid status '{}'. Valid options: new, in-progress, completed",
                s
            )),
        }
    }
}

/// A request sent through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ContactStatus,
}

impl Record for ContactSubmission {
    const COLLECTION: &'static str = collections::CONTACTS;
    const NOUN: &'static str = "request";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
