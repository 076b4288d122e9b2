//! Error types used by the bridge runtime and posted actions.
//!
//! This module defines two main error enums:
//!
//! - [`BridgeError`] — errors raised by the lifecycle supervisor itself.
//! - [`ActionError`] — errors raised by a single action executing on the
//!   worker context.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. An `ActionError` never halts the worker loop; a
//! `BridgeError` is returned to the host from the supervisor entry points.

use std::time::Duration;
use thiserror::Error;

use crate::core::LifecycleState;
use crate::engine::EngineFault;

/// # Errors produced by the bridge supervisor.
///
/// These represent failures of the coordination layer itself: rejected
/// lifecycle transitions, a failed engine bring-up, or a shutdown that
/// exceeded its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A lifecycle call was made from a state that does not permit it.
    ///
    /// The state is left unchanged.
    #[error("invalid lifecycle transition: {found} -> {requested}")]
    InvalidTransition {
        /// State the bridge was actually in.
        found: LifecycleState,
        /// State the rejected call would have entered.
        requested: LifecycleState,
    },

    /// Engine bring-up failed; the bridge moved directly to `Stopped`.
    #[error("engine bring-up failed: {fault}")]
    BringUp {
        /// The underlying fault (engine or program hook).
        #[source]
        fault: ActionError,
    },

    /// The pause hook faulted; the bridge reverted to `Running`.
    #[error("pause failed: {fault}")]
    PauseFailed {
        /// The underlying fault from the program's pause hook.
        #[source]
        fault: ActionError,
    },

    /// Shutdown grace period was exceeded; the worker is still busy.
    #[error("shutdown grace {grace:?} exceeded; worker still busy")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },

    /// The worker queue is closed (worker thread gone or never started).
    #[error("worker context is gone (queue closed)")]
    WorkerGone,
}

impl BridgeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BridgeError::InvalidTransition { .. } => "bridge_invalid_transition",
            BridgeError::BringUp { .. } => "bridge_bring_up_failed",
            BridgeError::PauseFailed { .. } => "bridge_pause_failed",
            BridgeError::GraceExceeded { .. } => "bridge_grace_exceeded",
            BridgeError::WorkerGone => "bridge_worker_gone",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BridgeError::InvalidTransition { found, requested } => {
                format!("transition rejected: {found} -> {requested}")
            }
            BridgeError::BringUp { fault } => format!("bring-up: {fault}"),
            BridgeError::PauseFailed { fault } => format!("pause: {fault}"),
            BridgeError::GraceExceeded { grace } => {
                format!("grace exceeded after {grace:?}")
            }
            BridgeError::WorkerGone => "worker queue closed".to_string(),
        }
    }
}

/// # Errors produced by a single worker action.
///
/// Faults local to one action are published on the bus and the worker loop
/// continues with the next queued action.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActionError {
    /// An engine call inside the action faulted.
    #[error(transparent)]
    Engine(#[from] EngineFault),

    /// A modal query was force-released before an answer arrived
    /// (front end torn down or shutdown in progress).
    #[error("modal query cancelled before an answer arrived")]
    ModalCancelled,

    /// A modal query was issued with an out-of-range choice count.
    #[error("modal query needs 1..=3 choices, got {count}")]
    InvalidModal {
        /// Number of choices supplied.
        count: usize,
    },

    /// Action-specific failure raised by host logic.
    #[error("action failed: {reason}")]
    Failed {
        /// The underlying failure message.
        reason: String,
    },
}

impl ActionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Engine(_) => "action_engine_fault",
            ActionError::ModalCancelled => "action_modal_cancelled",
            ActionError::InvalidModal { .. } => "action_invalid_modal",
            ActionError::Failed { .. } => "action_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActionError::Engine(fault) => format!("engine: {fault}"),
            ActionError::ModalCancelled => "modal cancelled".to_string(),
            ActionError::InvalidModal { count } => {
                format!("invalid modal: {count} choices")
            }
            ActionError::Failed { reason } => format!("error: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let err = BridgeError::InvalidTransition {
            found: LifecycleState::Stopped,
            requested: LifecycleState::Running,
        };
        assert_eq!(err.as_label(), "bridge_invalid_transition");
        assert!(err.as_message().contains("stopped"));
        assert!(err.as_message().contains("running"));

        let err = ActionError::ModalCancelled;
        assert_eq!(err.as_label(), "action_modal_cancelled");
    }

    #[test]
    fn engine_fault_converts() {
        let fault = EngineFault::Call {
            function: "heartbeat".into(),
            reason: "boom".into(),
        };
        let err: ActionError = fault.into();
        assert_eq!(err.as_label(), "action_engine_fault");
    }
}
