use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

/// Transient user-facing messages (the toast area of the page).
pub trait Notifier: Send + Sync {
    fn success(&self, text: &str);
    fn error(&self, text: &str);
}

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, title: &str, content: &str) -> bool;
}

/// Writes messages to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, text: &str) {
        info!(message = text, "Operation succeeded.");
    }

    fn error(&self, text: &str) {
        error!(message = text, "Operation failed.");
    }
}

/// Keeps messages so they can be returned with an HTTP response.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<Message>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Message> {
        match self.messages.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn push(&self, level: MessageLevel, text: &str) {
        let message = Message {
            level,
            text: text.to_string(),
        };
        match self.messages.lock() {
            Ok(mut guard) => guard.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn success(&self, text: &str) {
        self.push(MessageLevel::Success, text);
    }

    fn error(&self, text: &str) {
        self.push(MessageLevel::Error, text);
    }
}

/// Used where the caller has already confirmed, e.g. an HTTP DELETE from the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _title: &str, _content: &str) -> bool {
        true
    }
}
