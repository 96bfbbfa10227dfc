//! The decision dialog contract.
//!
//! The guard does not draw anything. A host implements [`DialogView`] and is
//! handed a [`DialogRequest`] describing what was found plus a
//! [`DialogResponder`] to report the user's choice with. [`DecisionDialog`]
//! keeps at most one view instance open and guarantees that each responder
//! fires at most one terminal action.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::{debug, trace};

use crate::controller::Signal;
use crate::privacy::Findings;

/// A user action on the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    /// Replace the redaction preview with user-edited text.
    EditPreview(String),
    /// Insert the (possibly edited) redaction preview.
    PasteRedacted,
    /// Insert the original clipboard text.
    PasteAnyway,
    /// Insert nothing.
    Cancel,
}

impl DialogAction {
    /// Whether this action resolves the dialog.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::EditPreview(_))
    }
}

/// Everything a view needs to render the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    /// Attempt this dialog belongs to.
    pub generation: u64,
    /// What was found.
    pub findings: Findings,
    /// The clipboard text as pasted.
    pub original: String,
    /// Initial value of the editable preview.
    pub redacted: String,
}

impl DialogRequest {
    /// Labels of the findings, in detection order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.findings.labels()
    }
}

/// Host-side presentation of the decision dialog.
pub trait DialogView: Send {
    /// Show the dialog.
    fn open(&mut self, request: DialogRequest, responder: DialogResponder);

    /// Remove the dialog from view.
    fn close(&mut self);
}

/// Reports the user's choice back to the guard.
///
/// Clones share one fired flag: after the first terminal action every later
/// call on any clone is a no-op and returns `false`.
#[derive(Clone)]
pub struct DialogResponder {
    generation: u64,
    fired: Arc<AtomicBool>,
    signals: WeakUnboundedSender<Signal>,
}

impl DialogResponder {
    pub(crate) fn new(generation: u64, signals: WeakUnboundedSender<Signal>) -> Self {
        Self {
            generation,
            fired: Arc::new(AtomicBool::new(false)),
            signals,
        }
    }

    /// Attempt this responder belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a terminal action has already fired.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Update the preview text. Returns `false` once resolved.
    pub fn edit_preview(&self, text: impl Into<String>) -> bool {
        if self.is_resolved() {
            return false;
        }
        self.send(DialogAction::EditPreview(text.into()))
    }

    /// Insert the redaction preview.
    pub fn paste_redacted(&self) -> bool {
        self.resolve(DialogAction::PasteRedacted)
    }

    /// Insert the original text.
    pub fn paste_anyway(&self) -> bool {
        self.resolve(DialogAction::PasteAnyway)
    }

    /// Insert nothing.
    pub fn cancel(&self) -> bool {
        self.resolve(DialogAction::Cancel)
    }

    fn resolve(&self, action: DialogAction) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            trace!(generation = self.generation, "Dialog already resolved, ignoring action");
            return false;
        }
        self.send(action)
    }

    fn send(&self, action: DialogAction) -> bool {
        let Some(signals) = self.signals.upgrade() else {
            debug!(generation = self.generation, "Guard stopped, dialog action dropped");
            return false;
        };
        signals
            .send(Signal::Dialog {
                generation: self.generation,
                action,
            })
            .is_ok()
    }

    /// Mark resolved without sending anything.
    pub(crate) fn disarm(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for DialogResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogResponder")
            .field("generation", &self.generation)
            .field("resolved", &self.is_resolved())
            .finish_non_exhaustive()
    }
}

/// The single live dialog instance.
pub struct DecisionDialog {
    view: Box<dyn DialogView>,
    live: Option<DialogResponder>,
}

impl DecisionDialog {
    /// Wrap a host view.
    #[must_use]
    pub fn new(view: Box<dyn DialogView>) -> Self {
        Self { view, live: None }
    }

    /// Open the dialog, closing any instance that is already open.
    pub fn open(&mut self, request: DialogRequest, responder: DialogResponder) {
        self.close();
        debug!(
            generation = request.generation,
            categories = ?request.labels(),
            "Opening decision dialog"
        );
        self.live = Some(responder.clone());
        self.view.open(request, responder);
    }

    /// Tear down the open dialog, if any.
    ///
    /// Its responder is disarmed so late clicks do nothing.
    pub fn close(&mut self) {
        if let Some(responder) = self.live.take() {
            trace!(generation = responder.generation(), "Closing decision dialog");
            responder.disarm();
            self.view.close();
        }
    }

    /// Whether a dialog is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.live.is_some()
    }

    /// Generation of the open dialog.
    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.live.as_ref().map(DialogResponder::generation)
    }
}

impl fmt::Debug for DecisionDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionDialog")
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}
