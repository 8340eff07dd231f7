use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::{ItemExtent, ItemRange};

/// Per-item extents with confirmed/estimated status and prefix-sum queries.
///
/// Two cumulative indexes are kept side by side: one over extents (offsets, totals and the
/// offset → index search) and one over unconfirmed flags (dirty counts and "next unconfirmed"
/// lookups). Both answer in `O(log n)`.
///
/// Point writes (`set`, `mark_dirty`) are `O(log n)`. Appending or truncating is `O(log n)` per
/// slot. Inserting or removing at `index` shifts `len - index` slots, so it costs
/// `O(min(len, (len - index) log n))`: edits near the end re-append the shifted tail, edits near
/// the front rebuild both indexes in one linear pass. Edits at the end are the cheap case.
///
/// All index arguments are checked; misuse panics with `IndexOutOfRange`.
#[derive(Clone, Debug)]
pub struct ExtentStore {
    slots: Vec<ItemExtent>,
    sums: Fenwick<f64>,
    dirty: Fenwick<usize>,
    clean: Option<ItemRange>,
}

impl Default for ExtentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtentStore {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            sums: Fenwick::new(),
            dirty: Fenwick::new(),
            clean: None,
        }
    }

    /// Restores a store from previously exported slots (see [`ExtentStore::snapshot`]).
    ///
    /// The clean region is set to the longest run of confirmed slots.
    ///
    /// # Panics
    ///
    /// Panics (`InvalidExtent`) if any extent is negative or not finite.
    #[track_caller]
    pub fn from_extents(extents: impl IntoIterator<Item = ItemExtent>) -> Self {
        let slots: Vec<ItemExtent> = extents
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                check_extent(i, slot.extent);
                slot
            })
            .collect();
        let sums = Fenwick::from_values(slots.iter().map(|s| s.extent));
        let dirty = Fenwick::from_values(slots.iter().map(|s| usize::from(!s.confirmed)));
        let clean = longest_confirmed_run(&slots);
        edebug!(len = slots.len(), dirty = dirty.total(), "ExtentStore::from_extents");
        Self {
            slots,
            sums,
            dirty,
            clean,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum of all extents.
    pub fn total_extent(&self) -> f64 {
        self.sums.total()
    }

    /// Number of slots whose extent is not confirmed.
    pub fn dirty_count(&self) -> usize {
        self.dirty.total()
    }

    pub fn has_dirty_items(&self) -> bool {
        self.dirty.total() > 0
    }

    /// A contiguous range known to hold only confirmed slots, if one is tracked.
    ///
    /// This may be smaller than the true clean run (or absent while one exists), but never
    /// covers an unconfirmed slot.
    pub fn clean_range(&self) -> Option<ItemRange> {
        self.clean
    }

    pub fn clean_range_start(&self) -> Option<usize> {
        self.clean.map(|r| r.first())
    }

    pub fn clean_range_end(&self) -> Option<usize> {
        self.clean.map(|r| r.last())
    }

    pub fn slots(&self) -> &[ItemExtent] {
        &self.slots
    }

    /// Exports every slot (useful for persistence).
    pub fn snapshot(&self) -> Vec<ItemExtent> {
        self.slots.clone()
    }

    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if `index >= len()`.
    #[track_caller]
    pub fn get(&self, index: usize) -> f64 {
        self.slot(index).extent
    }

    pub fn try_get(&self, index: usize) -> Option<f64> {
        self.slots.get(index).map(|s| s.extent)
    }

    pub fn extent_at(&self, index: usize) -> Option<ItemExtent> {
        self.slots.get(index).copied()
    }

    #[track_caller]
    pub fn is_confirmed(&self, index: usize) -> bool {
        self.slot(index).confirmed
    }

    /// Overwrites the extent and status of `index`.
    ///
    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if `index >= len()`, or (`InvalidExtent`) if `extent` is
    /// negative or not finite.
    #[track_caller]
    pub fn set(&mut self, index: usize, extent: f64, confirmed: bool) {
        let old = self.slot(index);
        check_extent(index, extent);
        etrace!(index, old = old.extent, extent, confirmed, "ExtentStore::set");

        self.sums.update(index, old.extent, extent);
        if old.confirmed != confirmed {
            self.dirty.update(
                index,
                usize::from(!old.confirmed),
                usize::from(!confirmed),
            );
        }
        self.slots[index] = ItemExtent { extent, confirmed };

        if confirmed {
            self.adopt_clean_run(index);
        } else {
            self.exclude_from_clean(index);
        }
    }

    /// Flags `index` as unconfirmed while keeping its last known extent.
    #[track_caller]
    pub fn mark_dirty(&mut self, index: usize) {
        if !self.slot(index).confirmed {
            return;
        }
        self.slots[index].confirmed = false;
        self.dirty.update(index, 0, 1);
        self.exclude_from_clean(index);
    }

    pub fn mark_all_dirty(&mut self) {
        edebug!(len = self.slots.len(), "ExtentStore::mark_all_dirty");
        for slot in &mut self.slots {
            slot.confirmed = false;
        }
        self.dirty = Fenwick::from_values(core::iter::repeat_n(1, self.slots.len()));
        self.clean = None;
    }

    /// Inserts an unconfirmed slot at `index`, seeded with `estimate(index)`.
    ///
    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if `index > len()`.
    #[track_caller]
    pub fn insert_at(&mut self, index: usize, estimate: impl FnOnce(usize) -> f64) {
        let len = self.slots.len();
        if index > len {
            index_out_of_range(index, len + 1);
        }
        let extent = check_extent(index, estimate(index));
        etrace!(index, extent, "ExtentStore::insert_at");

        self.slots.insert(index, ItemExtent::estimated(extent));
        self.reindex_from(index);

        if let Some(r) = self.clean {
            self.clean = if index <= r.first() {
                Some(ItemRange::new(r.first() + 1, r.last() + 1))
            } else if index <= r.last() {
                longer(
                    Some(ItemRange::new(r.first(), index - 1)),
                    Some(ItemRange::new(index + 1, r.last() + 1)),
                )
            } else {
                Some(r)
            };
        }
    }

    /// Removes the slot at `index` and returns it.
    #[track_caller]
    pub fn remove_at(&mut self, index: usize) -> ItemExtent {
        let len = self.slots.len();
        if index >= len {
            index_out_of_range(index, len);
        }
        let removed = self.slots.remove(index);
        etrace!(index, extent = removed.extent, "ExtentStore::remove_at");
        self.reindex_from(index);

        if let Some(r) = self.clean {
            self.clean = if index < r.first() {
                Some(ItemRange::new(r.first() - 1, r.last() - 1))
            } else if index <= r.last() {
                (r.len() > 1).then(|| ItemRange::new(r.first(), r.last() - 1))
            } else {
                Some(r)
            };
        }
        removed
    }

    /// Grows (appending estimated slots) or shrinks (dropping trailing slots) to `new_len`.
    #[track_caller]
    pub fn resize(&mut self, new_len: usize, mut estimate: impl FnMut(usize) -> f64) {
        let len = self.slots.len();
        edebug!(from = len, to = new_len, "ExtentStore::resize");
        if new_len >= len {
            self.slots.reserve(new_len - len);
            for i in len..new_len {
                let extent = check_extent(i, estimate(i));
                self.slots.push(ItemExtent::estimated(extent));
                self.sums.push(extent);
                self.dirty.push(1);
            }
            return;
        }

        self.slots.truncate(new_len);
        self.sums.truncate(new_len);
        self.dirty.truncate(new_len);
        if let Some(r) = self.clean {
            self.clean = if r.first() >= new_len {
                None
            } else {
                Some(ItemRange::new(r.first(), r.last().min(new_len - 1)))
            };
        }
    }

    /// Start offset of `index`; `offset_for_index(len())` is the total extent.
    ///
    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if `index > len()`.
    #[track_caller]
    pub fn offset_for_index(&self, index: usize) -> f64 {
        let len = self.slots.len();
        if index > len {
            index_out_of_range(index, len + 1);
        }
        self.sums.prefix_sum(index)
    }

    /// Index of the slot containing `offset`.
    ///
    /// An offset exactly at a slot's start belongs to that slot. Offsets at or past the total
    /// extent clamp to the last index; negative offsets clamp to `0`. Zero-extent slots own no
    /// offsets and are only returned when clamping lands on them.
    ///
    /// `index_for_offset(offset_for_index(i)) == i` for every slot with a positive extent.
    ///
    /// # Panics
    ///
    /// Panics (`IndexOutOfRange`) if the store is empty: there is no slot to clamp to, so check
    /// [`ExtentStore::is_empty`] first.
    #[track_caller]
    pub fn index_for_offset(&self, offset: f64) -> usize {
        let len = self.slots.len();
        if len == 0 {
            index_out_of_range(0, 0);
        }
        if !(offset > 0.0) {
            return 0;
        }
        self.sums.lower_bound(offset).min(len - 1)
    }

    /// First unconfirmed slot at or after `index`.
    pub fn first_unconfirmed_from(&self, index: usize) -> Option<usize> {
        if index >= self.slots.len() {
            return None;
        }
        let before = self.dirty.prefix_sum(index);
        (before < self.dirty.total()).then(|| self.dirty.lower_bound(before))
    }

    /// Whether any slot in `0..=index` is unconfirmed.
    #[track_caller]
    pub fn has_unconfirmed_through(&self, index: usize) -> bool {
        let len = self.slots.len();
        if index >= len {
            index_out_of_range(index, len);
        }
        self.dirty.prefix_sum(index + 1) > 0
    }

    /// Calls `f(index, start_offset, slot)` for every index in `range`, in order.
    ///
    /// Only the first start offset is a prefix query; the rest are accumulated.
    #[track_caller]
    pub fn for_each_extent_in(&self, range: ItemRange, mut f: impl FnMut(usize, f64, ItemExtent)) {
        let len = self.slots.len();
        if range.last() >= len {
            index_out_of_range(range.last(), len);
        }
        let mut start = self.sums.prefix_sum(range.first());
        for i in range.first()..=range.last() {
            let slot = self.slots[i];
            f(i, start, slot);
            start += slot.extent;
        }
    }

    #[track_caller]
    fn slot(&self, index: usize) -> ItemExtent {
        match self.slots.get(index) {
            Some(slot) => *slot,
            None => index_out_of_range(index, self.slots.len()),
        }
    }

    // Brings both indexes in line with `slots` after the slots from `index` on shifted.
    fn reindex_from(&mut self, index: usize) {
        let len = self.slots.len();
        let tail = len - index;
        let depth = (usize::BITS - len.leading_zeros()) as usize;
        if tail.saturating_mul(depth) > len {
            self.sums = Fenwick::from_values(self.slots.iter().map(|s| s.extent));
            self.dirty =
                Fenwick::from_values(self.slots.iter().map(|s| usize::from(!s.confirmed)));
            return;
        }
        self.sums.truncate(index);
        self.dirty.truncate(index);
        for slot in &self.slots[index..] {
            self.sums.push(slot.extent);
            self.dirty.push(usize::from(!slot.confirmed));
        }
    }

    // `index` was just confirmed: take the maximal confirmed run around it if it is at least as
    // long as the tracked region.
    fn adopt_clean_run(&mut self, index: usize) {
        let before = self.dirty.prefix_sum(index);
        let first = if before == 0 {
            0
        } else {
            self.dirty.lower_bound(before - 1) + 1
        };
        let last = if before == self.dirty.total() {
            self.slots.len() - 1
        } else {
            self.dirty.lower_bound(before) - 1
        };
        let run = ItemRange::new(first, last);
        if self.clean.is_none_or(|r| run.len() >= r.len()) {
            self.clean = Some(run);
        }
    }

    fn exclude_from_clean(&mut self, index: usize) {
        let Some(r) = self.clean else {
            return;
        };
        if !r.contains(index) {
            return;
        }
        let left = (index > r.first()).then(|| ItemRange::new(r.first(), index - 1));
        let right = (index < r.last()).then(|| ItemRange::new(index + 1, r.last()));
        self.clean = longer(left, right);
    }
}

fn longer(a: Option<ItemRange>, b: Option<ItemRange>) -> Option<ItemRange> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.len() > a.len() { b } else { a }),
        (a, b) => a.or(b),
    }
}

fn longest_confirmed_run(slots: &[ItemExtent]) -> Option<ItemRange> {
    let mut best: Option<ItemRange> = None;
    let mut run_start: Option<usize> = None;
    for (i, slot) in slots.iter().enumerate() {
        match (slot.confirmed, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                best = longer(best, Some(ItemRange::new(start, i - 1)));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        best = longer(best, Some(ItemRange::new(start, slots.len() - 1)));
    }
    best
}

#[track_caller]
pub(crate) fn check_extent(index: usize, extent: f64) -> f64 {
    if !(extent.is_finite() && extent >= 0.0) {
        ewarn!(index, extent, "rejecting invalid extent");
        panic!("InvalidExtent: extent for index {index} must be finite and >= 0 (got {extent})");
    }
    extent
}

#[cold]
#[track_caller]
pub(crate) fn index_out_of_range(index: usize, len: usize) -> ! {
    ewarn!(index, len, "index out of range");
    panic!("IndexOutOfRange: index {index} is outside 0..{len}");
}
