//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [bring-up-started]
//! [bring-up-succeeded]
//! [heartbeat-armed]
//! [action-failed] reason="engine call heartbeat failed: boom"
//! [modal-presented] prompt="replace current database?"
//! [modal-answered] choice=1
//! [stop-requested]
//! [drain-completed] elapsed_ms=12
//! [stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::BringUpStarted => println!("[bring-up-started]"),
            EventKind::BringUpSucceeded => println!("[bring-up-succeeded]"),
            EventKind::BringUpFailed => {
                println!("[bring-up-failed] reason={:?}", e.reason)
            }
            EventKind::HeartbeatArmed => println!("[heartbeat-armed]"),
            EventKind::HeartbeatCancelled => println!("[heartbeat-cancelled]"),
            EventKind::ActionFailed => {
                println!("[action-failed] reason={:?}", e.reason)
            }
            EventKind::ModalPresented => {
                println!("[modal-presented] prompt={:?}", e.reason)
            }
            EventKind::ModalAnswered => {
                println!("[modal-answered] choice={:?}", e.choice)
            }
            EventKind::ModalCancelled => println!("[modal-cancelled]"),
            EventKind::PauseRequested => println!("[pause-requested]"),
            EventKind::Paused => println!("[paused]"),
            EventKind::StopRequested => println!("[stop-requested]"),
            EventKind::DrainCompleted => {
                println!("[drain-completed] elapsed_ms={:?}", e.elapsed_ms)
            }
            EventKind::DrainTimedOut => {
                println!("[drain-timed-out] elapsed_ms={:?}", e.elapsed_ms)
            }
            EventKind::EngineReleased => println!("[engine-released]"),
            EventKind::Stopped => println!("[stopped]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                println!("[subscriber-warning] reason={:?}", e.reason)
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
