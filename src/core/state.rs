//! # Lifecycle state machine.
//!
//! ```text
//! Uninitialized ─► Starting ─► Running ─► Pausing ─► Paused
//!                     │           │          │          │
//!                     ▼           └──────────┼──────────┤
//!                  Stopped                   │          │
//!                     ▲              (fault) ▼          ▼
//!                     └── Stopping ◄── Running      Stopping
//! ```
//!
//! The cell is the one value legitimately read from both contexts without a
//! queue hop, so it is backed by an atomic. Writes go through
//! compare-exchange transitions; an invalid transition leaves the state
//! unchanged and reports what was found.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of the bridge.
///
/// `Stopped` is terminal: the engine cannot be safely reinitialized in the
/// same process lifetime.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, `start()` not yet called.
    Uninitialized = 0,
    /// Engine bring-up in progress on the worker thread.
    Starting = 1,
    /// Steady state: heartbeat armed, actions flowing.
    Running = 2,
    /// Pause action posted, awaiting the worker's acknowledgement.
    Pausing = 3,
    /// Embedded background work suspended; engine and heartbeat alive.
    Paused = 4,
    /// Stop in progress: heartbeat cancelled, drain pending or running.
    Stopping = 5,
    /// Terminal. The engine handle has been released.
    Stopped = 6,
}

impl LifecycleState {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Pausing => "pausing",
            LifecycleState::Paused => "paused",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        }
    }

    /// Whether the lifecycle graph permits moving from `self` to `next`.
    ///
    /// `Stopped` has no outgoing edges.
    fn allows(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Uninitialized, Starting)
                | (Starting, Running)
                | (Starting, Stopped)
                | (Running, Pausing)
                | (Running, Stopping)
                | (Pausing, Paused)
                | (Pausing, Running)
                | (Paused, Stopping)
                | (Stopping, Stopped)
        )
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LifecycleState::Uninitialized,
            1 => LifecycleState::Starting,
            2 => LifecycleState::Running,
            3 => LifecycleState::Pausing,
            4 => LifecycleState::Paused,
            5 => LifecycleState::Stopping,
            _ => LifecycleState::Stopped,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Race-free lifecycle cell readable from both contexts.
///
/// Mutated only by the lifecycle supervisor; the worker and the front read
/// it for informational checks.
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Uninitialized as u8))
    }

    /// Current state.
    pub(crate) fn load(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from -> to` atomically.
    ///
    /// Fails without touching the state if the cell is not in `from` or the
    /// lifecycle graph has no such edge.
    pub(crate) fn transition(
        &self,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), crate::error::BridgeError> {
        if !from.allows(to) {
            return Err(crate::error::BridgeError::InvalidTransition {
                found: self.load(),
                requested: to,
            });
        }
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|found| crate::error::BridgeError::InvalidTransition {
                found: LifecycleState::from_u8(found),
                requested: to,
            })
    }

    /// Moves to `to` from any of the `allowed` states, returning the state
    /// actually left.
    ///
    /// Edges absent from the lifecycle graph are skipped even when listed.
    pub(crate) fn transition_from(
        &self,
        allowed: &[LifecycleState],
        to: LifecycleState,
    ) -> Result<LifecycleState, crate::error::BridgeError> {
        for &from in allowed {
            if !from.allows(to) {
                continue;
            }
            if self
                .0
                .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Ok(from);
            }
        }
        Err(crate::error::BridgeError::InvalidTransition {
            found: self.load(),
            requested: to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    #[test]
    fn happy_path_transitions() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), LifecycleState::Uninitialized);
        cell.transition(LifecycleState::Uninitialized, LifecycleState::Starting)
            .unwrap();
        cell.transition(LifecycleState::Starting, LifecycleState::Running)
            .unwrap();
        cell.transition(LifecycleState::Running, LifecycleState::Pausing)
            .unwrap();
        cell.transition(LifecycleState::Pausing, LifecycleState::Paused)
            .unwrap();
        assert_eq!(
            cell.transition_from(
                &[LifecycleState::Running, LifecycleState::Paused],
                LifecycleState::Stopping,
            )
            .unwrap(),
            LifecycleState::Paused
        );
        cell.transition(LifecycleState::Stopping, LifecycleState::Stopped)
            .unwrap();
        assert_eq!(cell.load(), LifecycleState::Stopped);
    }

    #[test]
    fn invalid_transition_leaves_state_unchanged() {
        let cell = StateCell::new();
        let err = cell
            .transition(LifecycleState::Running, LifecycleState::Pausing)
            .unwrap_err();
        match err {
            BridgeError::InvalidTransition { found, requested } => {
                assert_eq!(found, LifecycleState::Uninitialized);
                assert_eq!(requested, LifecycleState::Pausing);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(cell.load(), LifecycleState::Uninitialized);
    }

    #[test]
    fn stopped_is_terminal() {
        let cell = StateCell::new();
        cell.transition(LifecycleState::Uninitialized, LifecycleState::Starting)
            .unwrap();
        cell.transition(LifecycleState::Starting, LifecycleState::Stopped)
            .unwrap();
        for to in [
            LifecycleState::Uninitialized,
            LifecycleState::Starting,
            LifecycleState::Running,
            LifecycleState::Pausing,
            LifecycleState::Paused,
            LifecycleState::Stopping,
        ] {
            assert!(cell.transition(LifecycleState::Stopped, to).is_err());
        }
        assert!(cell
            .transition_from(
                &[LifecycleState::Running, LifecycleState::Paused],
                LifecycleState::Stopping,
            )
            .is_err());
        assert_eq!(cell.load(), LifecycleState::Stopped);
    }
}
