//! Extent tracking for variably-sized virtualized lists.
//!
//! Item sizes ("extents") in a virtualized list are rarely known up front. They start out as
//! estimates, get replaced by measurements as items are laid out, and sometimes have to be
//! invalidated and measured again. This crate keeps that bookkeeping and answers the two
//! positional queries a list needs on every frame:
//! - where does item `i` start (`offset_for_index`), and
//! - which item contains offset `o` (`index_for_offset`).
//!
//! Two layers:
//! - [`ExtentStore`]: per-item extents with confirmed/estimated status, backed by cumulative-sum
//!   indexes so queries and point updates are `O(log n)`.
//! - [`ExtentCoordinator`]: wraps a store for a host layout process. It runs non-reentrant
//!   layout sessions, computes a scroll correction ratio when measurements correct known
//!   extents, tracks reported visible ranges, and notifies observers once per session when
//!   something changed.
//!
//! Measuring items, deciding which items to lay out, and scroll physics belong to the host,
//! which plugs in through [`ExtentDelegate`].
//!
//! Host misuse (out-of-range indexes, invalid ranges or extents, reentrant sessions) panics.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod coordinator;
mod delegate;
mod fenwick;
mod observer;
mod options;
mod reveal;
mod store;
mod types;


pub use coordinator::{ExtentCoordinator, LayoutSession};
pub use delegate::ExtentDelegate;
pub use observer::{ObserverCallback, ObserverId};
pub use options::{CoordinatorOptions, DEFAULT_CORRECTION_EPSILON};
pub use reveal::{Align, Viewport, reveal_offset};
pub use store::ExtentStore;
pub use types::{ItemExtent, ItemRange};
