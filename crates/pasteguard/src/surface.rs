//! Editable surfaces that pasted text is written into.
//!
//! The guard never owns a surface. Hosts hand it an [`ActiveSurface`] (strong
//! references they keep alive); the guard downgrades it to a [`SurfaceRef`]
//! and must cope with that reference going stale before it is used.

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, Weak};

/// A plain-text editable field with a value and a selection range.
///
/// Offsets are byte offsets into [`PlainTextSurface::value`].
pub trait PlainTextSurface: Send + Sync {
    /// Whether the surface is still attached to its document.
    fn is_attached(&self) -> bool {
        true
    }

    /// Give the surface input focus.
    fn focus(&self) {}

    /// The current value.
    fn value(&self) -> String;

    /// The current selection (`start == end` for a bare caret).
    fn selection(&self) -> Range<usize>;

    /// Replace the value.
    fn set_value(&self, value: String);

    /// Collapse the selection to a caret at `offset`.
    fn set_caret(&self, offset: usize);

    /// Tell listeners the value changed (an `input` event).
    fn notify_input(&self);
}

/// A rich content-editable region.
pub trait RichTextSurface: Send + Sync {
    /// Whether the surface is still attached to its document.
    fn is_attached(&self) -> bool {
        true
    }

    /// Give the surface input focus.
    fn focus(&self) {}

    /// Insert `text` as plain text at the caret, replacing any selection.
    fn insert_plain_text(&self, text: &str);
}

/// A live surface handed over by the host.
#[derive(Clone)]
pub enum ActiveSurface {
    /// A plain-text field.
    Plain(Arc<dyn PlainTextSurface>),
    /// A content-editable region.
    Rich(Arc<dyn RichTextSurface>),
}

impl ActiveSurface {
    /// Downgrade to a non-owning reference.
    #[must_use]
    pub fn downgrade(&self) -> SurfaceRef {
        match self {
            Self::Plain(surface) => SurfaceRef::Plain(Arc::downgrade(surface)),
            Self::Rich(surface) => SurfaceRef::Rich(Arc::downgrade(surface)),
        }
    }

    /// The kind of surface.
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::Plain(_) => SurfaceKind::Plain,
            Self::Rich(_) => SurfaceKind::Rich,
        }
    }

    /// Whether the surface is still attached to its document.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        match self {
            Self::Plain(surface) => surface.is_attached(),
            Self::Rich(surface) => surface.is_attached(),
        }
    }
}

impl fmt::Debug for ActiveSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActiveSurface").field(&self.kind()).finish()
    }
}

/// The capability a surface offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Value plus selection range.
    Plain,
    /// Content-editable region.
    Rich,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Rich => write!(f, "rich"),
        }
    }
}

/// A non-owning reference to a surface.
#[derive(Clone)]
pub enum SurfaceRef {
    /// A plain-text field.
    Plain(Weak<dyn PlainTextSurface>),
    /// A content-editable region.
    Rich(Weak<dyn RichTextSurface>),
}

impl SurfaceRef {
    /// Upgrade to a live surface.
    ///
    /// Returns `None` if the surface was dropped or has been detached.
    #[must_use]
    pub fn upgrade(&self) -> Option<ActiveSurface> {
        let surface = match self {
            Self::Plain(weak) => ActiveSurface::Plain(weak.upgrade()?),
            Self::Rich(weak) => ActiveSurface::Rich(weak.upgrade()?),
        };
        surface.is_attached().then_some(surface)
    }

    /// The kind of surface referenced.
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::Plain(_) => SurfaceKind::Plain,
            Self::Rich(_) => SurfaceKind::Rich,
        }
    }
}

impl fmt::Debug for SurfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRef")
            .field("kind", &self.kind())
            .field("live", &self.upgrade().is_some())
            .finish()
    }
}

impl From<&ActiveSurface> for SurfaceRef {
    fn from(surface: &ActiveSurface) -> Self {
        surface.downgrade()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeEditor, FakeField};
    use super::*;

    #[test]
    fn test_downgrade_and_upgrade() {
        let field = Arc::new(FakeField::empty());
        let surface = ActiveSurface::Plain(field.clone());
        let weak = surface.downgrade();

        assert_eq!(weak.kind(), SurfaceKind::Plain);
        assert!(weak.upgrade().is_some());
    }

    #[test]
    fn test_dropped_surface_is_stale() {
        let weak = {
            let editor: Arc<dyn RichTextSurface> = Arc::new(FakeEditor::default());
            ActiveSurface::Rich(editor).downgrade()
        };
        assert!(weak.upgrade().is_none());
        assert_eq!(weak.kind(), SurfaceKind::Rich);
    }

    #[test]
    fn test_detached_surface_is_stale() {
        let field = Arc::new(FakeField::empty());
        let weak = ActiveSurface::Plain(field.clone()).downgrade();

        field.detach();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_debug_does_not_panic() {
        let field = Arc::new(FakeField::empty());
        let surface = ActiveSurface::Plain(field);
        assert!(format!("{surface:?}").contains("Plain"));
        assert!(format!("{:?}", surface.downgrade()).contains("live: true"));
    }
}
