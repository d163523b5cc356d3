use crate::{DocumentError, Notification};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogOptions {
    pub height_percent: u8,
    pub width_percent: u8,
    pub display_in_iframe: bool,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            height_percent: 60,
            width_percent: 50,
            display_in_iframe: false,
        }
    }
}

/// Something the open dialog sent back to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Message(String),
    Lifecycle(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogLifecycle {
    NotFound,
    InvalidUrl,
    DomainNotAllowed,
    HttpsRequired,
    Closed,
    AlreadyOpen,
}

impl DialogLifecycle {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            12002 => Some(Self::NotFound),
            12003 => Some(Self::InvalidUrl),
            12004 => Some(Self::DomainNotAllowed),
            12005 => Some(Self::HttpsRequired),
            12006 => Some(Self::Closed),
            12007 => Some(Self::AlreadyOpen),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::NotFound => 12002,
            Self::InvalidUrl => 12003,
            Self::DomainNotAllowed => 12004,
            Self::HttpsRequired => 12005,
            Self::Closed => 12006,
            Self::AlreadyOpen => 12007,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Cannot load URL, 404 not found?",
            Self::InvalidUrl => "Invalid URL Syntax",
            Self::DomainNotAllowed => "Domain not in AppDomain list",
            Self::HttpsRequired => "HTTPS Required",
            Self::Closed => "Dialog closed",
            Self::AlreadyOpen => "Dialog already opened",
        }
    }
}

/// What the parent view should do in response to a dialog event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogReaction {
    pub notification: Option<Notification>,
    pub navigate_home: bool,
}

pub fn handle_dialog_event(event: &DialogEvent) -> DialogReaction {
    match event {
        DialogEvent::Message(message) => {
            tracing::debug!(len = message.len(), "dialog message received");
            DialogReaction {
                notification: Some(Notification::header_only(message.clone())),
                navigate_home: false,
            }
        }
        DialogEvent::Lifecycle(code) => match DialogLifecycle::from_code(*code) {
            Some(lifecycle) => {
                tracing::info!(code, message = lifecycle.message(), "dialog lifecycle event");
                DialogReaction {
                    notification: Some(Notification::header_only(lifecycle.message())),
                    navigate_home: lifecycle == DialogLifecycle::Closed,
                }
            }
            None => {
                tracing::debug!(code, "ignoring unknown dialog event code");
                DialogReaction::default()
            }
        },
    }
}

/// Opens a URL in a modal dialog owned by the host.
#[async_trait]
pub trait DialogHost: Send + Sync {
    async fn display_dialog(&self, url: &Url, options: &DialogOptions)
        -> Result<(), DocumentError>;
}

/// Opens the dialog, returning a notification when the host refused.
pub async fn open_dialog(
    host: &dyn DialogHost,
    url: &Url,
    options: &DialogOptions,
) -> Option<Notification> {
    match host.display_dialog(url, options).await {
        Ok(()) => {
            tracing::info!(url = %url, "dialog opened");
            None
        }
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "dialog failed to open");
            Some(Notification::new("Error:", err.to_string()))
        }
    }
}
