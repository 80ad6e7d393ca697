//! # Session Flag Store Port
//!
//! Persistence hook for the "last connected" flag so a later page load can
//! attempt a silent reconnection. Synchronous, like the rest of the local
//! store surface.

use std::sync::atomic::{AtomicBool, Ordering};

/// Durable storage for the reconnect hint.
pub trait SessionFlagStore: Send + Sync {
    /// Record whether a session was connected when it last changed state.
    fn set_last_connected(&self, connected: bool);

    /// Whether the previous session ended while connected.
    fn last_connected(&self) -> bool;
}

/// Process-local flag store for tests and simulation mode.
#[derive(Debug, Default)]
pub struct InMemoryFlagStore {
    flag: AtomicBool,
}

impl SessionFlagStore for InMemoryFlagStore {
    fn set_last_connected(&self, connected: bool) {
        self.flag.store(connected, Ordering::SeqCst);
    }

    fn last_connected(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
