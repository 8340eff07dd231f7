use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::observer::ObserverList;
use crate::store::check_extent;
use crate::{
    Align, CoordinatorOptions, ExtentDelegate, ExtentStore, ItemExtent, ItemRange, ObserverId,
};

/// Owns an [`ExtentStore`] and governs when its changes become visible to the host.
///
/// The host runs its layout pass inside a session ([`ExtentCoordinator::layout`] or
/// [`ExtentCoordinator::begin_layout`]). During a session the coordinator:
/// - accumulates correction statistics for confirmed extent writes,
/// - records the visible ranges the host reports,
/// - tracks whether anything observable changed.
///
/// When the session ends (on every exit path, including an early `Err` return or a panic in
/// the layout body) ranges that were not reported are cleared and, if anything changed,
/// observers are notified exactly once.
///
/// Structural edits and invalidations ask the delegate for a future layout via
/// [`ExtentDelegate::mark_needs_layout`] instead of notifying. Extent writes, `resize` and
/// `import_extents` count as session modifications when a session is open; outside one they
/// request a layout as well, and confirmed writes there stay out of the correction statistics.
pub struct ExtentCoordinator<D: ExtentDelegate> {
    store: ExtentStore,
    delegate: D,
    options: CoordinatorOptions,
    observers: ObserverList,

    in_session: bool,
    modified: bool,

    visible_range: Option<ItemRange>,
    visible_range_reported: bool,
    unobstructed_visible_range: Option<ItemRange>,
    unobstructed_visible_range_reported: bool,

    before_correction: f64,
    after_correction: f64,
}

impl<D: ExtentDelegate> ExtentCoordinator<D> {
    pub fn new(delegate: D) -> Self {
        Self::with_options(delegate, CoordinatorOptions::default())
    }

    /// Creates a coordinator with `options.initial_count` estimated items.
    pub fn with_options(mut delegate: D, options: CoordinatorOptions) -> Self {
        let mut store = ExtentStore::new();
        store.resize(options.initial_count, |i| delegate.estimate_extent(i));
        edebug!(
            initial_count = options.initial_count,
            correction_epsilon = options.correction_epsilon,
            "ExtentCoordinator::new"
        );
        Self {
            store,
            delegate,
            options,
            observers: ObserverList::default(),
            in_session: false,
            modified: false,
            visible_range: None,
            visible_range_reported: false,
            unobstructed_visible_range: None,
            unobstructed_visible_range_reported: false,
            before_correction: 0.0,
            after_correction: 0.0,
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &ExtentStore {
        &self.store
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// Subscribes `f` to end-of-session change notifications.
    pub fn add_observer(&mut self, f: impl Fn() + Send + Sync + 'static) -> ObserverId {
        self.observers.add(Arc::new(f))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// `true` while a layout session is open.
    pub fn is_locked(&self) -> bool {
        self.in_session
    }

    /// Whether an observable change happened since the last session began.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Opens a layout session; it ends when the returned guard is dropped.
    ///
    /// # Panics
    ///
    /// Panics (`ReentrantSessionError`) if a session is already open.
    #[track_caller]
    pub fn begin_layout(&mut self) -> LayoutSession<'_, D> {
        self.begin_session();
        LayoutSession { coordinator: self }
    }

    /// Runs `body` inside a layout session and returns its result.
    ///
    /// Session finalization runs before this returns, whatever `body` returns. Errors are the
    /// body's own business: return a `Result` and it is handed back unchanged.
    ///
    /// If `body` panics, the session is still closed while the panic unwinds, but observers are
    /// not notified then (with the `std` feature); [`Self::is_modified`] keeps reporting the
    /// change.
    ///
    /// # Panics
    ///
    /// Panics (`ReentrantSessionError`) if a session is already open.
    #[track_caller]
    pub fn layout<R>(&mut self, body: impl FnOnce(&mut LayoutSession<'_, D>) -> R) -> R {
        let mut session = self.begin_layout();
        body(&mut session)
    }

    #[track_caller]
    fn begin_session(&mut self) {
        if self.in_session {
            ewarn!("begin_layout called while a layout session is open");
            panic!("ReentrantSessionError: a layout session is already open");
        }
        etrace!(items = self.store.len(), "layout session begin");
        self.in_session = true;
        self.modified = false;
        self.visible_range_reported = false;
        self.unobstructed_visible_range_reported = false;
        self.before_correction = 0.0;
        self.after_correction = 0.0;
    }

    fn end_session(&mut self) {
        if !self.visible_range_reported && self.visible_range.take().is_some() {
            self.modified = true;
        }
        if !self.unobstructed_visible_range_reported
            && self.unobstructed_visible_range.take().is_some()
        {
            self.modified = true;
        }
        self.in_session = false;
        edebug!(
            modified = self.modified,
            correction_percentage = self.correction_percentage(),
            dirty = self.store.dirty_count(),
            "layout session end"
        );
        if self.modified {
            if unwinding() {
                ewarn!("layout session ended by a panic; observers not notified");
            } else {
                self.observers.notify_all();
            }
        }
    }

    // Marks the open session modified, or requests a layout when no session is open.
    fn note_change(&mut self) {
        if self.in_session {
            self.modified = true;
        } else {
            self.delegate.mark_needs_layout();
        }
    }

    pub fn number_of_items(&self) -> usize {
        self.store.len()
    }

    pub fn number_of_items_with_unconfirmed_extent(&self) -> usize {
        self.store.dirty_count()
    }

    pub fn total_extent(&self) -> f64 {
        self.store.total_extent()
    }

    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if `index >= number_of_items()`.
    #[track_caller]
    pub fn get_extent(&self, index: usize) -> ItemExtent {
        ItemExtent {
            extent: self.store.get(index),
            confirmed: self.store.is_confirmed(index),
        }
    }

    /// Index of the item containing `offset`, clamped to the valid items.
    ///
    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) when there are no items; hosts laying out an empty list check
    /// [`Self::number_of_items`] first.
    #[track_caller]
    pub fn index_for_offset(&self, offset: f64) -> usize {
        self.store.index_for_offset(offset)
    }

    #[track_caller]
    pub fn offset_for_index(&self, index: usize) -> f64 {
        self.store.offset_for_index(index)
    }

    pub fn visible_range(&self) -> Option<ItemRange> {
        self.visible_range
    }

    pub fn unobstructed_visible_range(&self) -> Option<ItemRange> {
        self.unobstructed_visible_range
    }

    /// Sum of the previous extents of every confirmed write this session.
    pub fn before_correction(&self) -> f64 {
        self.before_correction
    }

    /// Sum of the new extents of every confirmed write this session.
    pub fn after_correction(&self) -> f64 {
        self.after_correction
    }

    /// `after_correction / before_correction`, or `1.0` when `|before_correction|` does not
    /// exceed `options.correction_epsilon`.
    ///
    /// Hosts scale a scroll offset by this ratio to keep their anchor in place when
    /// previously known extents were corrected by measurement.
    pub fn correction_percentage(&self) -> f64 {
        let before = self.before_correction;
        let eps = self.options.correction_epsilon;
        if -eps <= before && before <= eps {
            return 1.0;
        }
        self.after_correction / before
    }

    /// Records a measured extent for `index`, confirming it.
    #[track_caller]
    pub fn set_extent(&mut self, index: usize, extent: f64) {
        self.write_extent(index, extent, false);
    }

    /// Records an estimated extent for `index`, leaving it unconfirmed.
    ///
    /// Estimated writes do not take part in correction statistics.
    #[track_caller]
    pub fn set_estimated_extent(&mut self, index: usize, extent: f64) {
        self.write_extent(index, extent, true);
    }

    #[track_caller]
    fn write_extent(&mut self, index: usize, extent: f64, estimation: bool) {
        let old = self.get_extent(index);
        check_extent(index, extent);
        if !estimation && self.in_session {
            self.before_correction += old.extent;
            self.after_correction += extent;
        }
        self.store.set(index, extent, !estimation);

        // A measurement that merely confirms a stale slot still counts as progress.
        if old.extent != extent || (!estimation && !old.confirmed) {
            self.note_change();
        }
    }

    /// Grows (with delegate estimates) or shrinks the item list to `count`.
    #[track_caller]
    pub fn resize(&mut self, count: usize) {
        if self.store.len() == count {
            return;
        }
        self.store
            .resize(count, |i| self.delegate.estimate_extent(i));
        self.note_change();
    }

    /// Inserts an estimated item at `index` and requests a layout.
    #[track_caller]
    pub fn insert_item(&mut self, index: usize) {
        self.store
            .insert_at(index, |i| self.delegate.estimate_extent(i));
        self.delegate.mark_needs_layout();
    }

    /// Removes the item at `index` and requests a layout.
    #[track_caller]
    pub fn remove_item(&mut self, index: usize) {
        self.store.remove_at(index);
        self.delegate.mark_needs_layout();
    }

    /// Marks `index` for re-measurement, keeping its last known extent, and requests a layout.
    #[track_caller]
    pub fn invalidate_extent(&mut self, index: usize) {
        self.store.mark_dirty(index);
        self.delegate.mark_needs_layout();
    }

    pub fn invalidate_all_extents(&mut self) {
        self.store.mark_all_dirty();
        self.delegate.mark_needs_layout();
    }

    /// Records the visible range for this session; `None` means nothing is visible.
    ///
    /// # Panics
    ///
    /// Panics (`ReportOutsideSession`) when no session is open.
    #[track_caller]
    pub fn report_visible_range(&mut self, range: Option<ItemRange>) {
        self.require_session("report_visible_range");
        self.visible_range_reported = true;
        if self.visible_range != range {
            etrace!(?range, "visible range changed");
            self.visible_range = range;
            self.modified = true;
        }
    }

    /// Same as [`Self::report_visible_range`], for the part not covered by overlays.
    #[track_caller]
    pub fn report_unobstructed_visible_range(&mut self, range: Option<ItemRange>) {
        self.require_session("report_unobstructed_visible_range");
        self.unobstructed_visible_range_reported = true;
        if self.unobstructed_visible_range != range {
            etrace!(?range, "unobstructed visible range changed");
            self.unobstructed_visible_range = range;
            self.modified = true;
        }
    }

    /// Asks the delegate for the scroll offset that reveals `index`.
    ///
    /// `rect` is forwarded untouched.
    ///
    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if `index >= number_of_items()`.
    #[track_caller]
    pub fn offset_to_reveal(&mut self, index: usize, align: Align, rect: Option<&D::Rect>) -> f64 {
        let estimation_only = self.store.has_unconfirmed_through(index);
        self.delegate
            .offset_to_reveal(&self.store, index, align, rect, estimation_only)
    }

    /// Exports every slot (useful for persistence).
    pub fn export_extents(&self) -> Vec<ItemExtent> {
        self.store.snapshot()
    }

    /// Replaces all slots with previously exported ones.
    #[track_caller]
    pub fn import_extents(&mut self, extents: impl IntoIterator<Item = ItemExtent>) {
        self.store = ExtentStore::from_extents(extents);
        edebug!(items = self.store.len(), "import_extents");
        self.note_change();
    }

    #[track_caller]
    fn require_session(&self, op: &'static str) {
        if !self.in_session {
            ewarn!(op, "range reported outside a layout session");
            panic!("ReportOutsideSession: {op} requires an open layout session");
        }
    }
}

#[cfg(feature = "std")]
fn unwinding() -> bool {
    std::thread::panicking()
}

#[cfg(not(feature = "std"))]
fn unwinding() -> bool {
    false
}

impl<D: ExtentDelegate> fmt::Debug for ExtentCoordinator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtentCoordinator")
            .field("store", &self.store)
            .field("options", &self.options)
            .field("observers", &self.observers)
            .field("in_session", &self.in_session)
            .field("modified", &self.modified)
            .field("visible_range", &self.visible_range)
            .field(
                "unobstructed_visible_range",
                &self.unobstructed_visible_range,
            )
            .field("before_correction", &self.before_correction)
            .field("after_correction", &self.after_correction)
            .finish_non_exhaustive()
    }
}

/// An open layout session. Dropping it ends the session.
///
/// Dereferences to the coordinator, so every coordinator operation is available while the
/// session is open.
pub struct LayoutSession<'a, D: ExtentDelegate> {
    coordinator: &'a mut ExtentCoordinator<D>,
}

impl<D: ExtentDelegate> Deref for LayoutSession<'_, D> {
    type Target = ExtentCoordinator<D>;

    fn deref(&self) -> &Self::Target {
        self.coordinator
    }
}

impl<D: ExtentDelegate> DerefMut for LayoutSession<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.coordinator
    }
}

impl<D: ExtentDelegate> Drop for LayoutSession<'_, D> {
    fn drop(&mut self) {
        self.coordinator.end_session();
    }
}

impl<D: ExtentDelegate> fmt::Debug for LayoutSession<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayoutSession").field(&self.coordinator).finish()
    }
}
