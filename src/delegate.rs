use crate::{Align, ExtentStore};

/// Host-side collaborator of an [`crate::ExtentCoordinator`].
///
/// The coordinator owns its delegate, so a delegate callback can never reach back into the
/// coordinator (and, through it, the store) while the coordinator is mid-update.
///
/// Plain closures `FnMut(usize) -> f64` implement this trait as estimate-only delegates.
pub trait ExtentDelegate {
    /// Geometry passed through to [`ExtentDelegate::offset_to_reveal`]. The core never
    /// inspects it.
    type Rect;

    /// Estimated extent for an item that has not been measured yet.
    ///
    /// Must be finite and non-negative; anything else panics (`InvalidExtent`).
    fn estimate_extent(&mut self, index: usize) -> f64;

    /// Asks the host to schedule a future layout session.
    ///
    /// Fire-and-forget; may be called outside a session.
    fn mark_needs_layout(&mut self) {}

    /// Scroll offset that reveals `index` under `align`.
    ///
    /// `estimation_only` is `true` when any item up to and including `index` is unconfirmed,
    /// i.e. the answer may move once those items are measured.
    ///
    /// The default ignores alignment and geometry and returns the item's start offset. See
    /// [`crate::reveal_offset`] for an alignment-aware building block.
    fn offset_to_reveal(
        &mut self,
        store: &ExtentStore,
        index: usize,
        align: Align,
        rect: Option<&Self::Rect>,
        estimation_only: bool,
    ) -> f64 {
        let _ = (align, rect, estimation_only);
        store.offset_for_index(index)
    }
}

impl<F: FnMut(usize) -> f64> ExtentDelegate for F {
    type Rect = ();

    fn estimate_extent(&mut self, index: usize) -> f64 {
        self(index)
    }
}
