//! # Runtime events emitted by the bridge.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Bring-up events**: engine initialization flow
//! - **Steady-state events**: heartbeat, action faults, modal queries, pause
//! - **Shutdown events**: stop request, drain outcome, engine release
//! - **Subscriber events**: fan-out overflow/panic diagnostics
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! reasons, the lifecycle state entered, and drain timings.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::LifecycleState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of bridge events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Bring-up events ===
    /// Engine bring-up started on the worker thread.
    BringUpStarted,

    /// Engine bring-up completed; the bridge is about to enter `Running`.
    BringUpSucceeded,

    /// Engine bring-up faulted; the bridge moves directly to `Stopped`.
    ///
    /// Sets `reason` with the fault message.
    BringUpFailed,

    // === Steady-state events ===
    /// Heartbeat armed; the first tick fires immediately.
    HeartbeatArmed,

    /// Heartbeat cancelled; no further ticks will be posted.
    HeartbeatCancelled,

    /// A single action faulted or panicked; the worker loop continues.
    ///
    /// Sets `reason` with the fault message.
    ActionFailed,

    /// A modal question was posted to the front context.
    ///
    /// Sets `reason` with the prompt text.
    ModalPresented,

    /// A modal question was answered.
    ///
    /// Sets `choice` with the selected index.
    ModalAnswered,

    /// A modal question was force-released without an answer.
    ModalCancelled,

    /// Pause requested; a pause action was posted to the worker queue.
    PauseRequested,

    /// Worker-side pause hook completed; the bridge is `Paused`.
    ///
    /// Sets `state`.
    Paused,

    // === Shutdown events ===
    /// Stop requested; the heartbeat is being cancelled.
    StopRequested,

    /// The engine's internal queue drained completely during shutdown.
    ///
    /// Sets `elapsed_ms`.
    DrainCompleted,

    /// The drain budget elapsed with engine work still pending; shutdown
    /// proceeded anyway.
    ///
    /// Sets `elapsed_ms`.
    DrainTimedOut,

    /// The engine handle was dropped. Published exactly once.
    EngineReleased,

    /// The bridge reached its terminal `Stopped` state.
    ///
    /// Sets `state`.
    Stopped,

    /// The worker did not acknowledge the stop action within the grace
    /// period.
    GraceExceeded,

    // === Subscriber events ===
    /// A subscriber panicked during event processing.
    ///
    /// Sets `reason` with the panic info.
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `reason`.
    SubscriberOverflow,
}

/// Bridge event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Human-readable reason (fault messages, prompts, overflow details).
    pub reason: Option<Arc<str>>,
    /// Lifecycle state entered, if applicable.
    pub state: Option<LifecycleState>,
    /// Modal choice index, if applicable.
    pub choice: Option<u32>,
    /// Elapsed drain time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            reason: None,
            state: None,
            choice: None,
            elapsed_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the lifecycle state entered.
    #[inline]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a modal choice index.
    #[inline]
    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice.min(u32::MAX as usize) as u32);
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }
}
