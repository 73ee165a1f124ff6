//! Notification payloads produced by the alert formatter.

use serde::Serialize;

/// A link button attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertButton {
    /// Button caption.
    pub label: String,
    /// Target URL.
    pub url: String,
}

impl AlertButton {
    /// Creates a new button.
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { label: label.into(), url: url.into() }
    }
}

/// A rendered notification: Markdown text plus rows of link buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertPayload {
    /// Message body.
    pub text: String,
    /// Button rows, rendered top to bottom.
    pub buttons: Vec<Vec<AlertButton>>,
}

impl AlertPayload {
    /// A payload without buttons.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), buttons: Vec::new() }
    }
}
