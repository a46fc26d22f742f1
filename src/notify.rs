//! Human-readable notifications (the toast channel).
//!
//! Every failure path in the crate ends in a [`Notice`]. Notices are always
//! logged through `tracing`; when a view holds the receiving end of
//! [`Notifier::channel`] it also gets them delivered for display.

use tokio::sync::mpsc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub title: String,
    pub message: String,
}

/// Receiving end of a notification channel.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Cloneable sender for notices.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    /// Creates a notifier together with the receiver that displays its notices.
    pub fn channel() -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier that only logs.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn notify(&self, notice: Notice) {
        match notice.level {
            Level::Info | Level::Success => {
                tracing::info!("{}: {}", notice.title, notice.message)
            }
            Level::Warning => tracing::warn!("{}: {}", notice.title, notice.message),
            Level::Error => tracing::error!("{}: {}", notice.title, notice.message),
        }

        if let Some(tx) = &self.tx {
            // The view may already be gone
            let _ = tx.send(notice);
        }
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Level::Info, title, message);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Level::Success, title, message);
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Level::Warning, title, message);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Level::Error, title, message);
    }

    fn push(&self, level: Level, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notice {
            level,
            title: title.into(),
            message: message.into(),
        });
    }
}

/// Collects every notice currently queued on `rx`.
pub fn drain(rx: &mut NoticeReceiver) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
