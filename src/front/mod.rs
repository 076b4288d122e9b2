//! # Front context: the UI-side action queue.
//!
//! The worker never touches UI state directly; it posts [`FrontAction`]s
//! through a [`FrontHandle`] into an ordered, unbounded queue. A dedicated
//! tokio task (the front runner) removes one action at a time and applies
//! it to the host's [`Frontend`] implementation, so the front end stays
//! responsive regardless of what the worker is doing.
//!
//! ## Rules
//! - Posting never blocks and is safe from any context.
//! - Actions execute strictly in posting order, one at a time.
//! - The only front action that carries a reply path is
//!   [`FrontAction::PresentModal`]; the answer travels back through the
//!   [`ModalResponder`](crate::ModalResponder), never through the queue.

mod action;
mod frontend;
mod handle;
mod runner;

pub use action::FrontAction;
pub use frontend::Frontend;
pub use handle::FrontHandle;

pub(crate) use runner::spawn_front_runner;

use tokio::sync::mpsc;

/// Creates the front queue pair: a handle for posting and the receiver the
/// front runner drains.
pub(crate) fn channel() -> (FrontHandle, mpsc::UnboundedReceiver<FrontAction>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FrontHandle::new(tx), rx)
}
