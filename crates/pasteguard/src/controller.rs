//! The paste interception state machine.
//!
//! One [`InterceptionController`] owns the lifecycle of every paste:
//!
//! ```text
//! Idle ──paste──▶ Intercepted ──read──▶ Deciding ──choice──▶ Idle
//!                      │                                  ▲
//!                      └──── no findings / empty / error ─┘
//! ```
//!
//! The controller is synchronous. It is driven by [`Signal`]s, and the
//! asynchronous steps (reading the clipboard, then querying the rule store)
//! happen outside of it. Results come back tagged with the generation of the
//! attempt that started them and are dropped if a newer attempt has begun
//! since.

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::{debug, info, trace, warn};

use crate::clipboard::ClipboardError;
use crate::dialog::{DecisionDialog, DialogAction, DialogRequest, DialogResponder, DialogView};
use crate::insert::{InsertOutcome, TextInserter};
use crate::privacy::{detect, redact, Findings, RuleSet};
use crate::storage::{RuleSource, RuleStore};
use crate::surface::SurfaceRef;

/// Input to the interception loop.
#[derive(Debug)]
pub enum Signal {
    /// A paste was intercepted and should start a new attempt.
    Paste {
        /// Where the text should go.
        target: SurfaceRef,
    },
    /// A clipboard read finished.
    Clipboard {
        /// Attempt that started the read.
        generation: u64,
        /// What the read produced.
        result: Result<Option<String>, ClipboardError>,
        /// Rule snapshot taken after the read.
        rules: RuleSet,
    },
    /// The user acted on the dialog.
    Dialog {
        /// Attempt the dialog belongs to.
        generation: u64,
        /// The action taken.
        action: DialogAction,
    },
    /// Stop the loop.
    Shutdown,
}

/// Coarse controller state, for hosts and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a paste.
    Idle,
    /// Paste suppressed, clipboard read pending.
    Intercepted,
    /// Dialog open, waiting for the user.
    Deciding,
}

/// Which text ended up in the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextVariant {
    /// The clipboard text as pasted.
    Original,
    /// The redaction preview, possibly edited.
    Redacted,
}

/// Result of feeding one signal to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Text was inserted.
    Inserted(TextVariant),
    /// The chosen text had nowhere to go.
    TargetGone,
    /// Findings were shown; waiting for the user.
    AwaitingDecision,
    /// The user edited the preview.
    PreviewUpdated,
    /// The user cancelled.
    Cancelled,
    /// The clipboard held no usable text.
    Empty,
    /// Reading the clipboard failed.
    Aborted,
    /// The signal belonged to a superseded or finished attempt.
    Ignored,
}

impl AttemptOutcome {
    /// Whether the attempt is over.
    #[must_use]
    pub fn is_final(self) -> bool {
        !matches!(
            self,
            Self::AwaitingDecision | Self::PreviewUpdated | Self::Ignored
        )
    }
}

/// One paste waiting for the user's decision.
#[derive(Debug, Clone)]
pub struct PasteAttempt {
    generation: u64,
    original: String,
    findings: Findings,
    preview: String,
    target: SurfaceRef,
    intercepted_at: DateTime<Utc>,
}

impl PasteAttempt {
    /// Attempt number.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The clipboard text as pasted.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// What was found.
    #[must_use]
    pub fn findings(&self) -> &Findings {
        &self.findings
    }

    /// The current preview text.
    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// When the paste was intercepted.
    #[must_use]
    pub fn intercepted_at(&self) -> DateTime<Utc> {
        self.intercepted_at
    }
}

enum State {
    Idle,
    Intercepted {
        generation: u64,
        target: SurfaceRef,
        intercepted_at: DateTime<Utc>,
    },
    Deciding(PasteAttempt),
}

/// Short, non-reversible identifier for logging pasted content.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes()).to_hex();
    hash.as_str()[..12].to_string()
}

/// Owns the paste lifecycle.
pub struct InterceptionController {
    rules: RuleSource,
    dialog: DecisionDialog,
    inserter: TextInserter,
    signals: WeakUnboundedSender<Signal>,
    state: State,
    generation: u64,
}

impl InterceptionController {
    /// Create a controller.
    ///
    /// `signals` is where dialog responders deliver user actions.
    #[must_use]
    pub fn new(
        store: Box<dyn RuleStore>,
        view: Box<dyn DialogView>,
        signals: WeakUnboundedSender<Signal>,
    ) -> Self {
        Self {
            rules: RuleSource::new(store),
            dialog: DecisionDialog::new(view),
            inserter: TextInserter::new(),
            signals,
            state: State::Idle,
            generation: 0,
        }
    }

    /// Add rules that apply on top of the store's rules.
    #[must_use]
    pub fn with_extra_rules(mut self, rules: Vec<String>) -> Self {
        self.rules = self.rules.with_extra_rules(rules);
        self
    }

    /// Handle for taking rule snapshots outside the controller.
    #[must_use]
    pub fn rule_source(&self) -> RuleSource {
        self.rules.clone()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Intercepted { .. } => Phase::Intercepted,
            State::Deciding(_) => Phase::Deciding,
        }
    }

    /// Generation of the most recent attempt (0 before the first paste).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The attempt awaiting a decision, if any.
    #[must_use]
    pub fn attempt(&self) -> Option<&PasteAttempt> {
        match &self.state {
            State::Deciding(attempt) => Some(attempt),
            _ => None,
        }
    }

    /// Start a new attempt for a suppressed paste.
    ///
    /// Any open dialog is discarded without inserting, and any pending read
    /// becomes stale. Returns the new generation.
    pub fn begin(&mut self, target: SurfaceRef) -> u64 {
        if let State::Deciding(previous) = &self.state {
            info!(
                generation = previous.generation,
                "New paste while deciding, discarding previous dialog"
            );
            self.dialog.close();
        } else if let State::Intercepted { generation, .. } = &self.state {
            debug!(generation, "New paste while reading, previous read is now stale");
        }

        self.generation = self.generation.wrapping_add(1);
        self.state = State::Intercepted {
            generation: self.generation,
            target,
            intercepted_at: Utc::now(),
        };
        trace!(generation = self.generation, "Paste intercepted");
        self.generation
    }

    /// Continue an attempt with the clipboard read result.
    ///
    /// Queries the rule store on the calling thread. Async callers should take
    /// a snapshot with [`RuleSource::load`] and use
    /// [`complete_read_with`](Self::complete_read_with) instead.
    pub fn complete_read(
        &mut self,
        generation: u64,
        result: Result<Option<String>, ClipboardError>,
    ) -> AttemptOutcome {
        let rules = self.rules.snapshot();
        self.complete_read_with(generation, result, &rules)
    }

    /// Continue an attempt with the clipboard read result, scanning against
    /// `rules`.
    pub fn complete_read_with(
        &mut self,
        generation: u64,
        result: Result<Option<String>, ClipboardError>,
        rules: &RuleSet,
    ) -> AttemptOutcome {
        let (target, intercepted_at) = match std::mem::replace(&mut self.state, State::Idle) {
            State::Intercepted {
                generation: current,
                target,
                intercepted_at,
            } if current == generation => (target, intercepted_at),
            other => {
                self.state = other;
                debug!(generation, current = self.generation, "Discarding stale clipboard read");
                return AttemptOutcome::Ignored;
            }
        };

        let text = match result {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(generation, "Clipboard held no text");
                return AttemptOutcome::Empty;
            }
            Err(e) => {
                warn!(generation, error = %e, "Clipboard read failed, paste aborted");
                return AttemptOutcome::Aborted;
            }
        };

        if text.trim().is_empty() {
            debug!(generation, "Clipboard text is blank, nothing to insert");
            return AttemptOutcome::Empty;
        }

        let findings = detect(&text, rules);
        debug!(
            generation,
            len = text.len(),
            fingerprint = %fingerprint(&text),
            categories = ?findings.labels(),
            "Scanned clipboard text"
        );

        if findings.is_empty() {
            return match self.inserter.insert(&target, &text) {
                InsertOutcome::Inserted => AttemptOutcome::Inserted(TextVariant::Original),
                InsertOutcome::TargetGone => AttemptOutcome::TargetGone,
            };
        }

        let redacted = redact(&text, rules);
        let request = DialogRequest {
            generation,
            findings: findings.clone(),
            original: text.clone(),
            redacted: redacted.clone(),
        };
        self.dialog
            .open(request, DialogResponder::new(generation, self.signals.clone()));
        self.state = State::Deciding(PasteAttempt {
            generation,
            original: text,
            findings,
            preview: redacted,
            target,
            intercepted_at,
        });
        AttemptOutcome::AwaitingDecision
    }

    /// Apply a dialog action to the attempt it belongs to.
    pub fn respond(&mut self, generation: u64, action: DialogAction) -> AttemptOutcome {
        let attempt = match &mut self.state {
            State::Deciding(attempt) if attempt.generation == generation => attempt,
            _ => {
                debug!(generation, "Dialog action for a closed attempt, ignoring");
                return AttemptOutcome::Ignored;
            }
        };

        let action = match action {
            DialogAction::EditPreview(text) => {
                attempt.preview = text;
                return AttemptOutcome::PreviewUpdated;
            }
            terminal => terminal,
        };

        let State::Deciding(attempt) = std::mem::replace(&mut self.state, State::Idle) else {
            return AttemptOutcome::Ignored;
        };
        self.dialog.close();

        let elapsed_ms = (Utc::now() - attempt.intercepted_at).num_milliseconds();
        let (text, variant) = match action {
            DialogAction::PasteRedacted => (attempt.preview, TextVariant::Redacted),
            DialogAction::PasteAnyway => (attempt.original, TextVariant::Original),
            DialogAction::Cancel | DialogAction::EditPreview(_) => {
                info!(generation, elapsed_ms, "Paste cancelled");
                return AttemptOutcome::Cancelled;
            }
        };

        info!(generation, elapsed_ms, ?variant, "Paste decision made");
        match self.inserter.insert(&attempt.target, &text) {
            InsertOutcome::Inserted => AttemptOutcome::Inserted(variant),
            InsertOutcome::TargetGone => AttemptOutcome::TargetGone,
        }
    }

    /// Close any open dialog and return to idle.
    pub fn reset(&mut self) {
        self.dialog.close();
        self.state = State::Idle;
    }
}

impl fmt::Debug for InterceptionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionController")
            .field("phase", &self.phase())
            .field("generation", &self.generation)
            .field("extra_rules", &self.rules.extra_len())
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}
