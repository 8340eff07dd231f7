use crate::ExtentStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    /// Keep the current offset if the item is fully visible, otherwise scroll the least amount.
    Auto,
}

/// The host's scroll window along the main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Current scroll offset.
    pub offset: f64,
    /// Visible size along the main axis.
    pub extent: f64,
    /// Space kept before a revealed item.
    pub padding_start: f64,
    /// Space kept after a revealed item.
    pub padding_end: f64,
}

impl Viewport {
    pub fn new(offset: f64, extent: f64) -> Self {
        Self {
            offset,
            extent,
            padding_start: 0.0,
            padding_end: 0.0,
        }
    }

    pub fn with_padding(mut self, padding_start: f64, padding_end: f64) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }
}

/// Computes the scroll offset that brings `index` into view under `align`.
///
/// The result is clamped to `[0, max(total_extent - viewport.extent, 0)]`. It is based on the
/// store's current extents, confirmed or not; callers that care can check
/// [`ExtentStore::has_unconfirmed_through`].
///
/// This is a building block for [`crate::ExtentDelegate::offset_to_reveal`] implementations.
///
/// # Panics
///
/// Panics (`IndexOutOfRange`) if `index >= store.len()`.
#[track_caller]
pub fn reveal_offset(store: &ExtentStore, index: usize, align: Align, viewport: Viewport) -> f64 {
    let size = store.get(index);
    let start = store.offset_for_index(index);
    let end = start + size;
    let view = viewport.extent;

    let to_start = start - viewport.padding_start;
    let to_end = end + viewport.padding_end - view;
    let target = match align {
        Align::Start => to_start,
        Align::End => to_end,
        Align::Center => start + size / 2.0 - view / 2.0,
        Align::Auto => {
            let cur = viewport.offset;
            if start >= cur && end <= cur + view {
                cur
            } else if start < cur {
                to_start
            } else {
                to_end
            }
        }
    };

    let max = (store.total_extent() - view).max(0.0);
    target.max(0.0).min(max)
}
