use alloc::vec::Vec;
use core::cmp;
use core::ops::{Add, Sub};

/// Values a [`Fenwick`] index can accumulate.
///
/// Implemented for `f64` (extents) and `usize` (unconfirmed-slot counts).
pub(crate) trait Weight: Copy + PartialOrd + Add<Output = Self> + Sub<Output = Self> {
    const ZERO: Self;
}

impl Weight for f64 {
    const ZERO: Self = 0.0;
}

impl Weight for usize {
    const ZERO: Self = 0;
}

/// Cumulative-sum index over a growable sequence.
///
/// Point updates, prefix sums and `lower_bound` run in `O(log n)`, and so do `push` and
/// `truncate` per element. `from_values` builds in `O(n)`.
///
/// `prefix_sum` is the single source of truth for sums: `total` and `lower_bound` are both
/// defined in terms of it, so float rounding never makes them disagree.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick<T> {
    tree: Vec<T>, // 1-indexed, tree[0] unused
    max_bit: usize,
}

impl<T: Weight> Fenwick<T> {
    pub(crate) fn new() -> Self {
        Self {
            tree: alloc::vec![T::ZERO],
            max_bit: 0,
        }
    }

    /// Builds the index in `O(n)`.
    pub(crate) fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let mut tree = alloc::vec![T::ZERO];
        tree.extend(values);
        let n = tree.len() - 1;
        for i in 1..=n {
            let j = i + lsb(i);
            if j <= n {
                tree[j] = tree[j] + tree[i];
            }
        }
        Self {
            tree,
            max_bit: highest_power_of_two_leq(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len() - 1
    }

    /// Appends `value` as the new last element.
    ///
    /// The new node covers `(n - lsb(n), n]`; its children are the nodes `n - 2^k` for every
    /// `2^k < lsb(n)`, all of which are already final.
    pub(crate) fn push(&mut self, value: T) {
        let n = self.len() + 1;
        let mut node = value;
        let mut step = 1usize;
        while step < lsb(n) {
            node = node + self.tree[n - step];
            step <<= 1;
        }
        self.tree.push(node);
        self.max_bit = highest_power_of_two_leq(n);
    }

    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        self.tree.truncate(new_len + 1);
        self.max_bit = highest_power_of_two_leq(new_len);
    }

    /// Replaces the element at `index`, given its previous value.
    pub(crate) fn update(&mut self, index: usize, old: T, new: T) {
        let n = self.len();
        debug_assert!(index < n, "Fenwick update out of bounds (idx={index}, len={n})");
        if index >= n {
            return;
        }
        if new > old {
            let delta = new - old;
            let mut i = index + 1;
            while i <= n {
                self.tree[i] = self.tree[i] + delta;
                i += lsb(i);
            }
        } else if old > new {
            let delta = old - new;
            let mut i = index + 1;
            while i <= n {
                self.tree[i] = self.tree[i] - delta;
                i += lsb(i);
            }
        }
    }

    /// Sum of the first `count` elements.
    pub(crate) fn prefix_sum(&self, count: usize) -> T {
        let mut i = cmp::min(count, self.len());
        let mut sum = T::ZERO;
        while i > 0 {
            sum = sum + self.tree[i];
            i &= i - 1;
        }
        sum
    }

    pub(crate) fn total(&self) -> T {
        self.prefix_sum(self.len())
    }

    /// Returns the largest `count` such that `prefix_sum(count) <= target`.
    ///
    /// Elements must be non-negative. A `target` below zero (or NaN) yields `0`.
    pub(crate) fn lower_bound(&self, target: T) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut rest = target;
        let mut bit = self.max_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= rest {
                rest = rest - self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }

        // The descent subtracts nodes largest-first while `prefix_sum` adds them smallest-first.
        // For floats the two can land a slot apart; settle against `prefix_sum` itself.
        while idx < n && self.prefix_sum(idx + 1) <= target {
            idx += 1;
        }
        while idx > 0 && self.prefix_sum(idx) > target {
            idx -= 1;
        }
        idx
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p <= n / 2 {
        p <<= 1;
    }
    p
}
