//! The guard runtime.
//!
//! [`PasteGuard::spawn`] moves an [`InterceptionController`] onto a tokio task
//! that consumes [`Signal`]s. Hosts keep the returned [`PasteGuard`] handle to
//! report focus and paste events; outcomes are reported on the returned event
//! receiver. The task ends on [`PasteGuard::shutdown`] or once every handle has
//! been dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::clipboard::{ClipboardSource, PasteEvent, PayloadKind};
use crate::config::Config;
use crate::controller::{AttemptOutcome, InterceptionController, Signal};
use crate::dialog::DialogView;
use crate::error::{Error, Result};
use crate::focus::FocusTracker;
use crate::privacy::RuleSet;
use crate::storage::RuleStore;
use crate::surface::ActiveSurface;

/// Runtime settings for a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOptions {
    /// Whether pastes are intercepted at all.
    pub enabled: bool,
    /// Rules applied on top of the rule store's.
    pub extra_rules: Vec<String>,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            extra_rules: Vec::new(),
        }
    }
}

impl From<&Config> for GuardOptions {
    fn from(config: &Config) -> Self {
        Self {
            enabled: config.guard.enabled,
            extra_rules: config.rules.extra.clone(),
        }
    }
}

/// What the host should do with a paste event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteDisposition {
    /// The guard left the event alone; let the default paste happen.
    PassThrough,
    /// The guard suppressed the event and took over.
    Intercepted,
}

/// A finished step of a paste attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardEvent {
    /// Attempt the outcome belongs to.
    pub generation: u64,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Handle to a running guard.
///
/// Cheap to clone. All clones talk to the same controller.
#[derive(Debug, Clone)]
pub struct PasteGuard {
    focus: FocusTracker,
    signals: UnboundedSender<Signal>,
    enabled: Arc<AtomicBool>,
}

impl PasteGuard {
    /// Start a guard on the current tokio runtime.
    ///
    /// Returns the handle, the receiver for [`GuardEvent`]s and the loop task.
    pub fn spawn(
        store: Box<dyn RuleStore>,
        view: Box<dyn DialogView>,
        clipboard: Arc<dyn ClipboardSource>,
        options: GuardOptions,
    ) -> (Self, UnboundedReceiver<GuardEvent>, JoinHandle<()>) {
        let (signals, signal_rx) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();

        let controller = InterceptionController::new(store, view, signals.downgrade())
            .with_extra_rules(options.extra_rules);
        let task = tokio::spawn(run(
            controller,
            clipboard,
            signals.downgrade(),
            signal_rx,
            events,
        ));

        let guard = Self {
            focus: FocusTracker::new(),
            signals,
            enabled: Arc::new(AtomicBool::new(options.enabled)),
        };
        info!(enabled = options.enabled, "Paste guard started");
        (guard, event_rx, task)
    }

    /// Report that an editable surface received focus.
    pub fn focus(&self, surface: &ActiveSurface) {
        self.focus.observe(surface);
    }

    /// Forget the focused surface, e.g. when the host tears it down.
    pub fn blur(&self) {
        self.focus.clear();
    }

    /// Handle a paste event.
    ///
    /// Suppresses the event and starts an attempt when the guard is enabled,
    /// an editable surface has been focused and the payload is text.
    /// Otherwise the event is left untouched.
    pub fn paste(&self, event: &dyn PasteEvent) -> PasteDisposition {
        if !self.is_enabled() {
            trace!("Guard disabled, paste passes through");
            return PasteDisposition::PassThrough;
        }
        if event.payload_kind() != PayloadKind::Text {
            trace!("Non-text paste passes through");
            return PasteDisposition::PassThrough;
        }
        let Some(target) = self.focus.current() else {
            trace!("No editable surface focused, paste passes through");
            return PasteDisposition::PassThrough;
        };

        if self.signals.send(Signal::Paste { target }).is_err() {
            debug!("Guard stopped, paste passes through");
            return PasteDisposition::PassThrough;
        }
        event.prevent_default();
        event.stop_propagation();
        PasteDisposition::Intercepted
    }

    /// Turn interception on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        info!(enabled, "Paste guard toggled");
    }

    /// Whether interception is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Whether the loop task is still accepting signals.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.signals.is_closed()
    }

    /// Ask the loop to stop. Any open dialog is closed without inserting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GuardStopped`] if the loop has already stopped.
    pub fn shutdown(&self) -> Result<()> {
        self.signals
            .send(Signal::Shutdown)
            .map_err(|_| Error::GuardStopped)
    }
}

async fn run(
    mut controller: InterceptionController,
    clipboard: Arc<dyn ClipboardSource>,
    signals: WeakUnboundedSender<Signal>,
    mut rx: UnboundedReceiver<Signal>,
    events: UnboundedSender<GuardEvent>,
) {
    let source = controller.rule_source();

    while let Some(signal) = rx.recv().await {
        let (generation, outcome) = match signal {
            Signal::Paste { target } => {
                let generation = controller.begin(target);
                let clipboard = Arc::clone(&clipboard);
                let source = source.clone();
                let reply = signals.clone();
                tokio::spawn(async move {
                    let result = clipboard.read_text().await;
                    let rules = match &result {
                        Ok(Some(text)) if !text.trim().is_empty() => source.load().await,
                        _ => RuleSet::empty(),
                    };
                    // Every handle may have been dropped while the read was pending.
                    if let Some(reply) = reply.upgrade() {
                        let _ = reply.send(Signal::Clipboard {
                            generation,
                            result,
                            rules,
                        });
                    }
                });
                continue;
            }
            Signal::Clipboard {
                generation,
                result,
                rules,
            } => (
                generation,
                controller.complete_read_with(generation, result, &rules),
            ),
            Signal::Dialog { generation, action } => {
                (generation, controller.respond(generation, action))
            }
            Signal::Shutdown => break,
        };

        if outcome == AttemptOutcome::Ignored {
            continue;
        }
        debug!(generation, ?outcome, "Paste attempt progressed");
        // Hosts that don't care about outcomes may drop the receiver.
        let _ = events.send(GuardEvent {
            generation,
            outcome,
        });
    }

    controller.reset();
    info!("Paste guard stopped");
}
