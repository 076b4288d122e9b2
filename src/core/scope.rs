//! # Scope: what an executing worker action sees.
//!
//! Every action and program hook receives a `&mut Scope` with exclusive
//! access to the engine for the duration of its run, plus the front handle
//! and the modal gate. Nothing here is reachable from the front context;
//! the single-writer rule on the engine holds by construction.

use crate::core::state::{LifecycleState, StateCell};
use crate::engine::Engine;
use crate::error::ActionError;
use crate::events::{Bus, Event, EventKind};
use crate::front::FrontHandle;
use crate::modal::{ModalAnswer, ModalGate, ModalResponder, ModalSlot};

/// Worker-side view handed to actions and program hooks.
pub struct Scope<'a> {
    pub(crate) engine: &'a mut dyn Engine,
    pub(crate) front: &'a FrontHandle,
    pub(crate) gate: &'a ModalGate,
    pub(crate) bus: &'a Bus,
    pub(crate) state: &'a StateCell,
}

impl<'a> Scope<'a> {
    /// Exclusive access to the embedded engine.
    pub fn engine(&mut self) -> &mut dyn Engine {
        &mut *self.engine
    }

    /// Handle for posting UI actions to the front context.
    pub fn front(&self) -> &FrontHandle {
        self.front
    }

    /// Current lifecycle state (informational; may change between reads).
    pub fn state(&self) -> LifecycleState {
        self.state.load()
    }

    /// Asks the front end a question and blocks until answered.
    ///
    /// Posts a present-question action to the front context carrying the
    /// prompt and `choices` (1–3 labels), then suspends the **worker**
    /// thread until the front end answers or the request is force-released.
    /// The front context itself never blocks; other worker actions queue
    /// behind this one.
    ///
    /// Returns the selected choice index, or
    /// [`ActionError::ModalCancelled`] if the front end was torn down,
    /// answered with an index the question did not offer, or shutdown
    /// force-released the gate.
    pub fn ask(&self, prompt: &str, choices: &[&str]) -> Result<usize, ActionError> {
        if choices.is_empty() || choices.len() > 3 {
            return Err(ActionError::InvalidModal {
                count: choices.len(),
            });
        }

        let (slot, rx) = ModalSlot::new(choices.len());
        self.gate.register(slot.clone());
        self.bus
            .publish(Event::new(EventKind::ModalPresented).with_reason(prompt));
        self.front
            .present_modal(prompt, choices, ModalResponder::new(slot));

        // The worker thread is off-runtime, so a blocking wait is safe.
        // A dropped responder resolves as Cancelled through its Drop impl;
        // a dropped front runner surfaces as a recv error.
        let answer = rx.blocking_recv().unwrap_or(ModalAnswer::Cancelled);
        self.gate.clear();

        match answer {
            ModalAnswer::Choice(choice) => {
                self.bus
                    .publish(Event::new(EventKind::ModalAnswered).with_choice(choice));
                Ok(choice)
            }
            ModalAnswer::Cancelled => {
                self.bus.publish(Event::new(EventKind::ModalCancelled));
                Err(ActionError::ModalCancelled)
            }
        }
    }
}
