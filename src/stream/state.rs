//! Lifecycle state shared between a stream task and its handles.
//!
//! The connection task is the only writer of the per-attempt state. The
//! `active` flag is written once, by whichever side stops the stream first.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

// ============================================================================
// ConnectionState
// ============================================================================

/// State of the current connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Transport open, frames are being delivered.
    Open,
    /// Attempt over. Either a reconnect is pending or the stream is done.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SharedState
// ============================================================================

/// State readable from any handle.
#[derive(Debug)]
pub(crate) struct SharedState {
    /// Cleared exactly once, never set again.
    active: AtomicBool,
    /// Connect attempts started so far.
    attempts: AtomicU64,
    /// State of the current attempt.
    state: RwLock<ConnectionState>,
}

impl SharedState {
    /// Creates the state of a freshly started stream.
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            attempts: AtomicU64::new(0),
            state: RwLock::new(ConnectionState::Connecting),
        }
    }

    /// Returns `true` until the stream is stopped.
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Clears the active flag.
    ///
    /// Returns `true` only for the call that actually cleared it.
    #[inline]
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }

    /// Records the start of a new attempt and returns its number (1-based).
    pub(crate) fn begin_attempt(&self) -> u64 {
        *self.state.write() = ConnectionState::Connecting;
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of connect attempts started so far.
    #[inline]
    pub(crate) fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// State of the current attempt.
    #[inline]
    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Moves the current attempt to `state`.
    #[inline]
    pub(crate) fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_active_and_connecting() {
        let shared = SharedState::new();
        assert!(shared.is_active());
        assert_eq!(shared.attempts(), 0);
        assert_eq!(shared.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_deactivate_only_once() {
        let shared = SharedState::new();
        assert!(shared.deactivate());
        assert!(!shared.deactivate());
        assert!(!shared.is_active());
    }

    #[test]
    fn test_begin_attempt_counts_and_resets_state() {
        let shared = SharedState::new();
        assert_eq!(shared.begin_attempt(), 1);
        shared.set_state(ConnectionState::Closed);

        assert_eq!(shared.begin_attempt(), 2);
        assert_eq!(shared.state(), ConnectionState::Connecting);
        assert_eq!(shared.attempts(), 2);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
    }
}
