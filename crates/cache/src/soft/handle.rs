//! Reporting memory pressure to a memory-sensitive cache

use crossbeam::channel::Sender;

/// A reclamation request, applied on the cache's next operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Pressure {
    /// Reclaim this many entries
    Entries(usize),
    /// Reclaim entries until at least this much weight is freed
    Weight(u64),
    /// Reclaim everything
    All,
}

/// Cloneable, thread-safe sender of reclamation requests
///
/// Every method returns `false` once the cache it belongs to is gone.
#[derive(Debug, Clone)]
pub struct ReclaimHandle {
    tx: Sender<Pressure>,
}

impl ReclaimHandle {
    pub(super) fn new(tx: Sender<Pressure>) -> Self {
        Self { tx }
    }

    pub fn reclaim_entries(&self, count: usize) -> bool {
        self.send(Pressure::Entries(count))
    }

    pub fn reclaim_weight(&self, weight: u64) -> bool {
        self.send(Pressure::Weight(weight))
    }

    pub fn reclaim_all(&self) -> bool {
        self.send(Pressure::All)
    }

    fn send(&self, pressure: Pressure) -> bool {
        self.tx.send(pressure).is_ok()
    }
}
