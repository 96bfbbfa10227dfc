//! `pasteguard` - A paste-boundary guard for sensitive content
//!
//! This library intercepts paste events, scans the clipboard text for email
//! addresses, API keys, tokens, IP addresses, private keys and user-defined
//! rules, and lets the user choose between a redacted and the original text
//! before anything reaches the focused surface.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod dialog;
pub mod error;
pub mod focus;
pub mod insert;
pub mod logging;
pub mod privacy;
pub mod runtime;
pub mod storage;
pub mod surface;

pub use clipboard::{ClipboardError, ClipboardSource, PasteEvent, PayloadKind, SystemClipboard};
pub use config::Config;
pub use controller::{AttemptOutcome, InterceptionController, Phase, Signal, TextVariant};
pub use dialog::{DialogAction, DialogRequest, DialogResponder, DialogView};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use privacy::{detect, redact, Category, Findings, RuleSet};
pub use runtime::{GuardEvent, GuardOptions, PasteDisposition, PasteGuard};
pub use storage::{MemoryRuleStore, RuleSource, RuleStore, SqliteRuleStore};
pub use surface::{ActiveSurface, PlainTextSurface, RichTextSurface, SurfaceRef};
