//! Writing chosen text into the target surface.

use std::ops::Range;

use tracing::{debug, trace};

use crate::surface::{ActiveSurface, PlainTextSurface, RichTextSurface, SurfaceRef};

/// What an insertion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The text was written.
    Inserted,
    /// The target was gone; nothing was written.
    TargetGone,
}

/// Writes text into plain or rich surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextInserter;

impl TextInserter {
    /// Create a new inserter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Insert `text` into `target`.
    ///
    /// A stale target is a no-op.
    pub fn insert(&self, target: &SurfaceRef, text: &str) -> InsertOutcome {
        let Some(surface) = target.upgrade() else {
            debug!(kind = %target.kind(), "Insert target is gone, dropping text");
            return InsertOutcome::TargetGone;
        };

        match surface {
            ActiveSurface::Plain(field) => insert_plain(field.as_ref(), text),
            ActiveSurface::Rich(editor) => insert_rich(editor.as_ref(), text),
        }
        InsertOutcome::Inserted
    }
}

/// Splice `text` over the selection, put the caret after it and notify.
fn insert_plain(field: &dyn PlainTextSurface, text: &str) {
    field.focus();

    let mut value = field.value();
    let range = clamp_selection(&value, field.selection());
    let caret = range.start + text.len();

    value.replace_range(range, text);
    field.set_value(value);
    field.set_caret(caret);
    field.notify_input();

    trace!(len = text.len(), caret, "Inserted into plain surface");
}

fn insert_rich(editor: &dyn RichTextSurface, text: &str) {
    editor.focus();
    editor.insert_plain_text(text);
    trace!(len = text.len(), "Inserted into rich surface");
}

/// Normalize a host-reported selection so it can be spliced safely.
///
/// The ends are ordered, clamped to the value and moved back onto character
/// boundaries.
fn clamp_selection(value: &str, selection: Range<usize>) -> Range<usize> {
    let (start, end) = if selection.start <= selection.end {
        (selection.start, selection.end)
    } else {
        (selection.end, selection.start)
    };
    let start = floor_char_boundary(value, start);
    let end = floor_char_boundary(value, end);
    start..end
}

fn floor_char_boundary(value: &str, index: usize) -> usize {
    let mut index = index.min(value.len());
    while !value.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::*;
    use crate::surface::testing::{FakeEditor, FakeField};

    fn insert_into(field: &Arc<FakeField>, text: &str) -> InsertOutcome {
        let surface = ActiveSurface::Plain(field.clone());
        TextInserter::new().insert(&surface.downgrade(), text)
    }

    #[test]
    fn test_insert_at_caret() {
        let field = Arc::new(FakeField::new("hello world", 5..5));

        assert_eq!(insert_into(&field, ","), InsertOutcome::Inserted);
        assert_eq!(field.text(), "hello, world");
        assert_eq!(field.caret(), 6..6);
        assert_eq!(field.inputs.load(Ordering::SeqCst), 1);
        assert_eq!(field.focused.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let field = Arc::new(FakeField::new("pay OLD now", 4..7));

        insert_into(&field, "[REDACTED]");
        assert_eq!(field.text(), "pay [REDACTED] now");
        assert_eq!(field.caret(), 14..14);
    }

    #[test]
    fn test_insert_with_reversed_and_out_of_range_selection() {
        let field = Arc::new(FakeField::new("abc", 99..1));

        insert_into(&field, "Z");
        assert_eq!(field.text(), "aZ");
        assert_eq!(field.caret(), 2..2);
    }

    #[test]
    fn test_insert_snaps_to_char_boundary() {
        // 'é' is two bytes; offset 2 falls inside it.
        let field = Arc::new(FakeField::new("héllo", 2..2));

        insert_into(&field, "x");
        assert_eq!(field.text(), "hxéllo");
    }

    #[test]
    fn test_insert_into_rich_surface() {
        let editor = Arc::new(FakeEditor::default());
        let surface = ActiveSurface::Rich(editor.clone());

        let outcome = TextInserter::new().insert(&surface.downgrade(), "<b>not html</b>");
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(editor.contents(), "<b>not html</b>");
    }

    #[test]
    fn test_stale_target_is_noop() {
        let field = Arc::new(FakeField::new("keep", 0..0));
        let target = ActiveSurface::Plain(field.clone()).downgrade();
        field.detach();

        assert_eq!(TextInserter::new().insert(&target, "x"), InsertOutcome::TargetGone);
        assert_eq!(field.text(), "keep");
        assert_eq!(field.inputs.load(Ordering::SeqCst), 0);
    }
}
