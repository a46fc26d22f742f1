//! `atelier` subcommands.

mod auth;
mod collections;
mod content;
mod watch;

pub use auth::{login, logout, status};
pub use collections::{
    CategoriesCommand, ContactsCommand, GalleryCommand, ServicesCommand, SocialCommand,
};
pub use content::ContentCommand;
pub use watch::WatchCommand;

use clap::ValueEnum;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;

use atelier::admin::AdminError;
use atelier::auth::{AuthError, SessionContext};
use atelier::config::{Config, ConfigError};
use atelier::content::EditError;
use atelier::notify::{Level, NoticeReceiver, Notifier};
use atelier::store::{RemoteStore, StoreError};
use atelier::upload::UploadError;

/// How long a command waits for the first snapshot.
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No store configured. Set store_url in the config file or ATELIER_STORE_URL")]
    NotConfigured,
    #[error("Not signed in. Run `atelier login <email>` first")]
    NotSignedIn,
    #[error("Timed out waiting for {0}")]
    Timeout(String),
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shared state for one CLI invocation.
pub struct Context {
    pub config: Config,
    pub notifier: Notifier,
    notices: NoticeReceiver,
    assume_yes: bool,
}

impl Context {
    pub fn new(config: Config, assume_yes: bool) -> Self {
        let (notifier, notices) = Notifier::channel();
        Self {
            config,
            notifier,
            notices,
            assume_yes,
        }
    }

    pub fn store_url(&self) -> Result<&str, CliError> {
        self.config.store_url().ok_or(CliError::NotConfigured)
    }

    /// Session saved by `login`, anonymous when there is none.
    pub fn session(&self) -> Result<SessionContext, CliError> {
        Ok(SessionContext::fixed(self.config.load_session()?))
    }

    /// Like [`session`](Self::session), but fails when nobody is signed in.
    pub fn admin_session(&self) -> Result<SessionContext, CliError> {
        let session = self.session()?;
        if !session.is_admin() {
            return Err(CliError::NotSignedIn);
        }
        Ok(session)
    }

    /// Store client carrying the saved session.
    pub fn store(&self) -> Result<RemoteStore, CliError> {
        Ok(RemoteStore::new(self.store_url()?).with_session(self.session()?))
    }

    /// Asks on stdin unless `--yes` was given.
    pub fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("y")
    }

    /// Prints queued notices. Errors are left to the returned `Result`.
    pub fn flush_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            match notice.level {
                Level::Success => println!("✓ {}", notice.message),
                Level::Info => println!("{}", notice.message),
                Level::Warning => eprintln!("! {}: {}", notice.title, notice.message),
                Level::Error => {}
            }
        }
    }
}

/// Waits for `ready` or fails after [`LOAD_TIMEOUT`].
pub async fn load(what: &str, ready: impl Future<Output = ()>) -> Result<(), CliError> {
    tokio::time::timeout(LOAD_TIMEOUT, ready)
        .await
        .map_err(|_| CliError::Timeout(what.to_string()))
}

/// Reads a line from stdin after printing `prompt`.
pub fn prompt_line(prompt: &str) -> Result<String, CliError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Shortens `text` to `max` characters for table output.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Chair", 10), "Chair");
        assert_eq!(truncate("Реставрация", 5), "Рест…");
    }
}
