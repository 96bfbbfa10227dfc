//! Terminal host for `pasteguard paste`.
//!
//! stdout plays the editable surface, and the decision dialog is a prompt on
//! stderr answered from stdin.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::clipboard::PasteEvent;
use crate::dialog::{DialogRequest, DialogResponder, DialogView};
use crate::surface::RichTextSurface;

/// A choice read from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Redacted,
    Anyway,
    Edit,
    Cancel,
    Unknown,
}

impl Choice {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "redacted" => Self::Redacted,
            "a" | "anyway" => Self::Anyway,
            "e" | "edit" => Self::Edit,
            "c" | "cancel" => Self::Cancel,
            _ => Self::Unknown,
        }
    }
}

fn read_line(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let trimmed = line.trim_end_matches(['\n', '\r']).len();
            line.truncate(trimmed);
            Some(line)
        }
    }
}

fn show_preview(output: &mut impl Write, preview: &str) -> io::Result<()> {
    writeln!(output, "--- redacted preview ---")?;
    writeln!(output, "{preview}")?;
    writeln!(output, "------------------------")
}

/// Run the prompt until the user makes a terminal choice or input ends.
///
/// End of input counts as cancel.
fn prompt(
    request: &DialogRequest,
    responder: &DialogResponder,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        output,
        "Sensitive content detected: {}",
        request.labels().join(", ")
    )?;
    show_preview(output, &request.redacted)?;

    while !responder.is_resolved() {
        write!(
            output,
            "[r] paste redacted  [a] paste anyway  [e] edit preview  [c] cancel: "
        )?;
        output.flush()?;

        let Some(line) = read_line(input) else {
            responder.cancel();
            break;
        };
        match Choice::parse(&line) {
            Choice::Redacted => {
                responder.paste_redacted();
            }
            Choice::Anyway => {
                responder.paste_anyway();
            }
            Choice::Cancel => {
                responder.cancel();
            }
            Choice::Edit => {
                writeln!(output, "New preview (one line):")?;
                let Some(text) = read_line(input) else {
                    responder.cancel();
                    break;
                };
                show_preview(output, &text)?;
                responder.edit_preview(text);
            }
            Choice::Unknown => writeln!(output, "Unrecognized choice: {}", line.trim())?,
        }
    }
    Ok(())
}

/// Decision dialog on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalDialog;

impl TerminalDialog {
    /// Create a terminal dialog.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DialogView for TerminalDialog {
    fn open(&mut self, request: DialogRequest, responder: DialogResponder) {
        let fallback = responder.clone();
        let spawned = std::thread::Builder::new()
            .name("pasteguard-dialog".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                let mut stderr = io::stderr();
                if let Err(e) = prompt(&request, &responder, &mut stdin.lock(), &mut stderr) {
                    warn!(error = %e, "Terminal dialog failed, cancelling paste");
                    responder.cancel();
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Could not start terminal dialog, cancelling paste");
            fallback.cancel();
        }
    }

    fn close(&mut self) {
        // The prompt thread stops once its responder is resolved.
        debug!("Terminal dialog closed");
    }
}

/// stdout as a paste target.
#[derive(Debug, Default)]
pub struct StdoutSurface;

impl StdoutSurface {
    /// Create a stdout surface.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RichTextSurface for StdoutSurface {
    fn insert_plain_text(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
            warn!(error = %e, "Failed to write pasted text to stdout");
        }
    }
}

/// The paste request raised by `pasteguard paste`.
#[derive(Debug, Default)]
pub struct TerminalPaste {
    suppressed: AtomicBool,
}

impl TerminalPaste {
    /// Create a paste request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the guard took the paste over.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst)
    }
}

impl PasteEvent for TerminalPaste {
    fn prevent_default(&self) {
        self.suppressed.store(true, Ordering::SeqCst);
    }

    fn stop_propagation(&self) {}
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tokio::sync::mpsc;

    use super::*;
    use crate::controller::Signal;
    use crate::dialog::DialogAction;
    use crate::privacy::Category;

    fn request() -> DialogRequest {
        DialogRequest {
            generation: 3,
            findings: [Category::Email, Category::ApiKey].into_iter().collect(),
            original: "a@b.com".to_string(),
            redacted: "[REDACTED_EMAIL]".to_string(),
        }
    }

    fn run(input: &str) -> (Vec<DialogAction>, String) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let responder = DialogResponder::new(3, tx.downgrade());
        let mut output = Vec::new();

        prompt(
            &request(),
            &responder,
            &mut Cursor::new(input.as_bytes()),
            &mut output,
        )
        .unwrap();

        let mut actions = Vec::new();
        while let Ok(Signal::Dialog { action, .. }) = rx.try_recv() {
            actions.push(action);
        }
        (actions, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(Choice::parse("r\n"), Choice::Redacted);
        assert_eq!(Choice::parse(" A "), Choice::Anyway);
        assert_eq!(Choice::parse("edit"), Choice::Edit);
        assert_eq!(Choice::parse("c"), Choice::Cancel);
        assert_eq!(Choice::parse("x"), Choice::Unknown);
    }

    #[test]
    fn test_prompt_shows_findings() {
        let (actions, output) = run("r\n");
        assert_eq!(actions, vec![DialogAction::PasteRedacted]);
        assert!(output.contains("Email Address, API Key"));
        assert!(output.contains("[REDACTED_EMAIL]"));
    }

    #[test]
    fn test_prompt_edit_then_paste() {
        let (actions, _) = run("e\nmail someone\nr\n");
        assert_eq!(
            actions,
            vec![
                DialogAction::EditPreview("mail someone".to_string()),
                DialogAction::PasteRedacted,
            ]
        );
    }

    #[test]
    fn test_prompt_retries_unknown_choice() {
        let (actions, output) = run("what\na\n");
        assert_eq!(actions, vec![DialogAction::PasteAnyway]);
        assert!(output.contains("Unrecognized choice: what"));
    }

    #[test]
    fn test_prompt_eof_cancels() {
        let (actions, _) = run("");
        assert_eq!(actions, vec![DialogAction::Cancel]);
    }

    #[test]
    fn test_prompt_stops_after_choice() {
        let (actions, _) = run("c\nr\n");
        assert_eq!(actions, vec![DialogAction::Cancel]);
    }

    #[test]
    fn test_terminal_paste_suppression() {
        let paste = TerminalPaste::new();
        assert!(!paste.is_suppressed());
        paste.prevent_default();
        assert!(paste.is_suppressed());
    }
}
