//! Power-management event trace
//!
//! A fixed-depth ring of the most recent PSCI hook invocations. Once the
//! ring is full the oldest entry is dropped.

use heapless::{Deque, Vec};

/// Number of events kept
pub const PM_TRACE_DEPTH: usize = 32;

/// PSCI hook that produced a trace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Power-on requested for the given core index
    PowerDomainOn(usize),
    PowerDomainOff,
    PowerDomainSuspend,
    PowerDomainOnFinish,
    PowerDomainSuspendFinish,
}

/// One recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub event: TraceEvent,
    /// Core that executed the hook
    pub core: usize,
}

/// Ring buffer of trace entries
#[derive(Debug, Default)]
pub struct PmTrace {
    entries: Deque<TraceEntry, PM_TRACE_DEPTH>,
}

impl PmTrace {
    /// Create an empty trace
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Record an event, evicting the oldest one when full
    pub fn record(&mut self, event: TraceEvent, core: usize) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail: a slot was freed above if needed.
        let _ = self.entries.push_back(TraceEntry { event, core });
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the entries, oldest first
    pub fn snapshot(&self) -> Vec<TraceEntry, PM_TRACE_DEPTH> {
        self.entries.iter().copied().collect()
    }
}
