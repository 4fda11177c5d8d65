//! Bounded dedup window over message timestamps.
//!
//! The gateway may redeliver a message after a reconnect or a server-side
//! retry. The window remembers the most recent timestamps so redeliveries
//! are discarded instead of reaching the sink twice.

use std::collections::BTreeSet;

/// Maximum number of timestamps held in the window.
pub const MAX_TRACKED_MESSAGES: usize = 1000;

/// Bounded seen-set of message timestamps.
///
/// Owned by one supervisor instance; independent triggers keep independent
/// windows. Eviction removes the numerically smallest timestamp, which with
/// monotonic gateway timestamps is the oldest message.
#[derive(Debug, Default)]
pub struct DedupWindow {
    seen: BTreeSet<u64>,
}

impl DedupWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `timestamp` is currently present in the window
    pub fn seen(&self, timestamp: u64) -> bool {
        self.seen.contains(&timestamp)
    }

    /// Insert `timestamp` unconditionally.
    ///
    /// Callers check [`seen`](Self::seen) first to decide whether to process
    /// the message. If the insertion pushes the window past capacity, the
    /// smallest held timestamp is evicted.
    pub fn record(&mut self, timestamp: u64) {
        self.seen.insert(timestamp);
        if self.seen.len() > MAX_TRACKED_MESSAGES {
            self.seen.pop_first();
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
