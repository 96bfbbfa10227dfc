//! Tracking of the most recently focused editable surface.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::surface::{ActiveSurface, SurfaceRef};

/// Observes focus changes and remembers the last editable surface.
///
/// Clones share the same slot. Only the guard front-end writes to it; the
/// interception path only reads.
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    current: Arc<RwLock<Option<SurfaceRef>>>,
}

impl FocusTracker {
    /// Create a tracker that has not seen any focus yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `surface` received focus.
    pub fn observe(&self, surface: &ActiveSurface) {
        trace!(kind = %surface.kind(), "Editable surface focused");
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(surface.downgrade());
    }

    /// The last focused surface, if any surface has ever been focused.
    ///
    /// The reference may already be stale.
    #[must_use]
    pub fn current(&self) -> Option<SurfaceRef> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the tracked surface.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
