//! Compile request sequencing.
//!
//! Repeated compiles are neither debounced nor cancelled in flight, so
//! two requests can race. Instead of last-response-wins, every request
//! gets a monotonically increasing id and only the latest issued id may
//! commit its response; anything older is discarded by the caller.

use std::sync::atomic::{AtomicU64, Ordering};

pub type RequestId = u64;

#[derive(Debug, Default)]
pub struct CompileTracker {
    latest: AtomicU64,
}

impl CompileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next request id. Every compile begins here.
    pub fn begin(&self) -> RequestId {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True if `id` is still the latest issued request and its response
    /// may be committed to workspace state.
    pub fn try_complete(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id
    }
}
