//! # Program: the embedded application driven by the worker.
//!
//! [`Program`] is the seam between the bridge and the application logic
//! living inside the engine. The worker thread invokes its hooks at the
//! lifecycle points of the bridge:
//!
//! - [`bring_up`](Program::bring_up) once after engine initialization,
//!   before any queued action is consumed;
//! - [`heartbeat`](Program::heartbeat) for every tick routed through the
//!   worker queue;
//! - [`pause`](Program::pause) when the host requests `pause()`;
//! - [`shut_down`](Program::shut_down) as the first step of the stop drain,
//!   telling the embedded logic to stop accepting new work.
//!
//! Every hook receives a [`Scope`] with exclusive access to the engine, the
//! front handle, and the modal gate; hooks run to completion before the
//! next action is dispatched.

use crate::core::Scope;
use crate::error::ActionError;

/// Hooks the worker drives into the embedded application.
///
/// A faulting `heartbeat` is logged and the loop continues; a faulting
/// `bring_up` aborts startup; a faulting `pause` reverts the bridge to
/// `Running`; a faulting `shut_down` is logged and the drain proceeds.
pub trait Program: Send + 'static {
    /// Starts the embedded application after engine initialization.
    ///
    /// Typically imports the application's entry module and calls its start
    /// function. A fault here is fatal to the startup attempt.
    fn bring_up(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError>;

    /// Runs one periodic upkeep tick.
    fn heartbeat(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError>;

    /// Suspends the embedded application's own background work.
    ///
    /// The heartbeat keeps running and the engine stays alive.
    fn pause(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError> {
        let _ = scope;
        Ok(())
    }

    /// Tells the embedded application to stop accepting new work.
    ///
    /// Runs before the engine drain during shutdown.
    fn shut_down(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError> {
        let _ = scope;
        Ok(())
    }
}
