use core::fmt;

/// An inclusive range of item indexes, `first..=last`.
///
/// Constructed through [`ItemRange::new`], which rejects `first > last`. Equality and ordering
/// compare `(first, last)` by value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRange {
    first: usize,
    last: usize,
}

impl ItemRange {
    /// Creates `first..=last`.
    ///
    /// # Panics
    ///
    /// Panics (`InvalidRange`) if `first > last`.
    #[track_caller]
    pub fn new(first: usize, last: usize) -> Self {
        if first > last {
            ewarn!(first, last, "ItemRange::new: first > last");
            panic!("InvalidRange: first ({first}) must not exceed last ({last})");
        }
        Self { first, last }
    }

    /// A range covering a single index.
    pub fn single(index: usize) -> Self {
        Self {
            first: index,
            last: index,
        }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    /// Number of indexes covered (always at least one).
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.first <= index && index <= self.last
    }
}

impl fmt::Debug for ItemRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemRange({}..={})", self.first, self.last)
    }
}

/// The stored state of one slot: its extent and whether that extent came from a measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemExtent {
    /// Size along the scroll axis.
    pub extent: f64,
    /// `false` while the extent is an estimate (or a stale measurement) awaiting confirmation.
    pub confirmed: bool,
}

impl ItemExtent {
    pub fn confirmed(extent: f64) -> Self {
        Self {
            extent,
            confirmed: true,
        }
    }

    pub fn estimated(extent: f64) -> Self {
        Self {
            extent,
            confirmed: false,
        }
    }
}
