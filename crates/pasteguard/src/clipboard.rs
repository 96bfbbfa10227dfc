//! Clipboard access and paste signals.
//!
//! The guard reads clipboard text through the [`ClipboardSource`] trait, so
//! hosts can plug in a browser clipboard, the OS clipboard ([`SystemClipboard`])
//! or a scripted source in tests. Paste signals arrive as [`PasteEvent`]s which
//! the guard may suppress.

use async_trait::async_trait;
use clipboard_rs::{Clipboard, ClipboardContext};
use thiserror::Error;
use tracing::trace;

/// Errors that can occur while reading the clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The host refused clipboard access.
    #[error("clipboard access denied: {0}")]
    Denied(String),

    /// Failed to access the clipboard.
    #[error("clipboard access failed: {0}")]
    AccessFailed(String),
}

/// Result type for clipboard operations.
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Source of pasted clipboard text.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    /// Read the current clipboard text.
    ///
    /// Returns `Ok(None)` when the clipboard holds no text.
    ///
    /// # Errors
    ///
    /// Returns an error if clipboard access is denied or fails.
    async fn read_text(&self) -> Result<Option<String>>;
}

/// The kind of payload a paste carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Plain text; the guard inspects it.
    Text,
    /// Images, files and other non-text payloads; left to the host.
    Other,
}

/// A paste request raised by the host.
pub trait PasteEvent {
    /// What the paste carries.
    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Text
    }

    /// Suppress the host's default paste handling.
    fn prevent_default(&self);

    /// Stop the event from reaching other listeners.
    fn stop_propagation(&self);
}

/// The operating system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Create a handle to the system clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn read_blocking() -> Result<Option<String>> {
        let ctx =
            ClipboardContext::new().map_err(|e| ClipboardError::AccessFailed(e.to_string()))?;

        match ctx.get_text() {
            Ok(text) if !text.is_empty() => {
                trace!(len = text.len(), "Read system clipboard text");
                Ok(Some(text))
            }
            // No text content or non-text clipboard is not an error
            Ok(_) | Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_text(&self) -> Result<Option<String>> {
        tokio::task::spawn_blocking(Self::read_blocking)
            .await
            .map_err(|e| ClipboardError::AccessFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_error_display() {
        assert!(ClipboardError::Denied("no user gesture".to_string())
            .to_string()
            .contains("denied"));
        assert!(ClipboardError::AccessFailed("busy".to_string())
            .to_string()
            .contains("busy"));
    }

    #[test]
    fn test_default_payload_kind_is_text() {
        struct Bare;
        impl PasteEvent for Bare {
            fn prevent_default(&self) {}
            fn stop_propagation(&self) {}
        }
        assert_eq!(Bare.payload_kind(), PayloadKind::Text);
    }
}
