use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// A zero-argument change notification.
pub type ObserverCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by `add_observer`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Subscribers notified when a layout session finishes with visible changes.
#[derive(Clone, Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(ObserverId, ObserverCallback)>,
}

impl ObserverList {
    pub(crate) fn add(&mut self, callback: ObserverCallback) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify_all(&self) {
        for (_, callback) in &self.entries {
            callback();
        }
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
