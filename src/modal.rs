//! # Modal query gate: single-release answer delivery.
//!
//! The worker context can ask the front end a question and suspend until a
//! human (or automated responder in tests) supplies an answer. The gate
//! bridges that synchronous "ask and wait" into an asynchronous UI prompt:
//!
//! ```text
//! worker: Scope::ask ──► ModalSlot + FrontAction::PresentModal ──► front queue
//!            │                                                        │
//!            │  blocking_recv                      Frontend::present_modal
//!            ▼                                                        │
//!        (suspended) ◄──────── ModalResponder::answer(choice) ◄───────┘
//! ```
//!
//! ## Invariants
//! - The slot is released **at most once** per request: `resolve` takes the
//!   sender out of the slot under a lock, so a second release is a no-op.
//! - [`ModalResponder::answer`] consumes the responder; answering twice is
//!   unrepresentable.
//! - Dropping the responder unanswered (front end torn down mid-question)
//!   releases the gate with [`ModalAnswer::Cancelled`], so the worker never
//!   hangs forever.
//! - At most one request is outstanding per worker: the worker is blocked
//!   while it waits, so it cannot issue a second question.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

/// Outcome of a modal query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalAnswer {
    /// The front end selected the choice with this index.
    Choice(usize),
    /// The request was force-released without an answer.
    Cancelled,
}

/// Single-slot result cell shared by the responder and the gate.
///
/// Holds the answer sender until the first release, plus the number of
/// choices the question offered.
pub(crate) struct ModalSlot {
    tx: Mutex<Option<oneshot::Sender<ModalAnswer>>>,
    choice_count: usize,
}

impl ModalSlot {
    /// Creates a slot and the receiver the asking worker blocks on.
    ///
    /// `choice_count` bounds the indices a responder may deliver.
    pub(crate) fn new(choice_count: usize) -> (Arc<Self>, oneshot::Receiver<ModalAnswer>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Self {
            tx: Mutex::new(Some(tx)),
            choice_count,
        });
        (slot, rx)
    }

    /// Releases the slot with `answer`.
    ///
    /// An out-of-range choice index is an invalid answer and resolves as
    /// [`ModalAnswer::Cancelled`] so the waiting worker never observes an
    /// index the question did not offer. Returns `false` if the slot was
    /// already released; the answer is then discarded.
    pub(crate) fn resolve(&self, answer: ModalAnswer) -> bool {
        let answer = match answer {
            ModalAnswer::Choice(i) if i >= self.choice_count => {
                eprintln!(
                    "[bridgevisor] modal answer index {i} out of range (question offered {})",
                    self.choice_count
                );
                ModalAnswer::Cancelled
            }
            other => other,
        };
        let sender = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        match sender {
            Some(tx) => {
                // The receiver may be gone if the asker was torn down;
                // either way the slot is now spent.
                let _ = tx.send(answer);
                true
            }
            None => false,
        }
    }
}

/// Front-side handle used to deliver the answer for one modal question.
///
/// Consumed by [`answer`](ModalResponder::answer); dropping it unanswered
/// cancels the query.
pub struct ModalResponder {
    slot: Arc<ModalSlot>,
}

impl ModalResponder {
    pub(crate) fn new(slot: Arc<ModalSlot>) -> Self {
        Self { slot }
    }

    /// Records the selected choice index and releases the waiting worker.
    ///
    /// A release after the gate was already force-released is a
    /// programming-error class fault; it is reported and the answer is
    /// discarded.
    pub fn answer(self, choice: usize) {
        if !self.slot.resolve(ModalAnswer::Choice(choice)) {
            eprintln!("[bridgevisor] modal answer arrived after the gate was released");
        }
    }
}

impl Drop for ModalResponder {
    fn drop(&mut self) {
        // No-op if `answer` already resolved the slot.
        self.slot.resolve(ModalAnswer::Cancelled);
    }
}

/// Tracks the at-most-one outstanding modal request per worker.
///
/// The shutdown path uses [`cancel_pending`](ModalGate::cancel_pending) to
/// force-release a question the front end will never answer. It also
/// latches the gate closed: a request registered *after* that point (an
/// action already running when the stop was issued) is resolved as
/// [`ModalAnswer::Cancelled`] on registration, so the worker can never
/// block on a question issued behind the shutdown.
pub(crate) struct ModalGate {
    inner: Mutex<GateInner>,
}

struct GateInner {
    pending: Option<Arc<ModalSlot>>,
    closed: bool,
}

impl ModalGate {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(GateInner {
                pending: None,
                closed: false,
            }),
        }
    }

    /// Registers the outstanding request before the worker blocks on it.
    ///
    /// A registration against a closed gate resolves immediately as
    /// cancelled instead of being parked.
    pub(crate) fn register(&self, slot: Arc<ModalSlot>) {
        let closed = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if !inner.closed {
                inner.pending = Some(Arc::clone(&slot));
            }
            inner.closed
        };
        if closed {
            slot.resolve(ModalAnswer::Cancelled);
        }
    }

    /// Clears the outstanding request once the answer was consumed.
    pub(crate) fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).pending = None;
    }

    /// Closes the gate and force-releases any outstanding request with
    /// [`ModalAnswer::Cancelled`].
    ///
    /// Idempotent; a request that was already answered is untouched. Once
    /// closed the gate stays closed.
    pub(crate) fn cancel_pending(&self) {
        let slot = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.closed = true;
            inner.pending.take()
        };
        if let Some(slot) = slot {
            slot.resolve(ModalAnswer::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answer_delivers_choice() {
        let (slot, rx) = ModalSlot::new(3);
        let responder = ModalResponder::new(slot);
        responder.answer(2);
        assert_eq!(rx.await.unwrap(), ModalAnswer::Choice(2));
    }

    #[tokio::test]
    async fn dropped_responder_cancels() {
        let (slot, rx) = ModalSlot::new(2);
        let responder = ModalResponder::new(slot);
        drop(responder);
        assert_eq!(rx.await.unwrap(), ModalAnswer::Cancelled);
    }

    #[tokio::test]
    async fn release_happens_at_most_once() {
        let (slot, rx) = ModalSlot::new(2);
        assert!(slot.resolve(ModalAnswer::Choice(0)));
        assert!(!slot.resolve(ModalAnswer::Choice(1)));
        assert_eq!(rx.await.unwrap(), ModalAnswer::Choice(0));
    }

    #[tokio::test]
    async fn out_of_range_answer_resolves_cancelled() {
        let (slot, rx) = ModalSlot::new(2);
        let responder = ModalResponder::new(slot);
        responder.answer(7);
        assert_eq!(rx.await.unwrap(), ModalAnswer::Cancelled);
    }

    #[tokio::test]
    async fn gate_force_release_unblocks_pending() {
        let gate = ModalGate::new();
        let (slot, rx) = ModalSlot::new(2);
        gate.register(Arc::clone(&slot));
        gate.cancel_pending();
        assert_eq!(rx.await.unwrap(), ModalAnswer::Cancelled);
        // A later answer through the responder is a silent no-op.
        ModalResponder::new(slot).answer(1);
    }

    #[tokio::test]
    async fn gate_cancel_after_answer_is_noop() {
        let gate = ModalGate::new();
        let (slot, rx) = ModalSlot::new(1);
        gate.register(Arc::clone(&slot));
        ModalResponder::new(slot).answer(0);
        gate.cancel_pending();
        assert_eq!(rx.await.unwrap(), ModalAnswer::Choice(0));
    }

    #[tokio::test]
    async fn registration_after_close_resolves_immediately() {
        let gate = ModalGate::new();
        gate.cancel_pending();

        // A question raced in behind the shutdown must not park forever.
        let (slot, rx) = ModalSlot::new(1);
        gate.register(Arc::clone(&slot));
        assert_eq!(rx.await.unwrap(), ModalAnswer::Cancelled);
    }
}
