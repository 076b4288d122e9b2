//! # Worker: the dedicated thread that owns the engine.
//!
//! The engine is `Send` but not `Sync`, and every call into it takes
//! `&mut self`. The worker thread is therefore the only place the engine
//! exists: it is created here during bring-up, every queued action runs
//! here, and it is dropped here during teardown. Nothing outside this
//! module ever holds a reference to it.
//!
//! ```text
//!                  (unbounded, FIFO)
//!   WorkerHandle ──► queue ──► blocking_recv loop ──► Scope ──► Engine
//! ```
//!
//! Actions run strictly in arrival order. A panicking action is caught,
//! reported on the bus, and the loop keeps serving; the engine is assumed
//! to stay usable across a hook panic.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};

use crate::config::Config;
use crate::engine::{Engine, EngineLoader};
use crate::error::{ActionError, BridgeError};
use crate::events::{Bus, Event, EventKind};
use crate::front::FrontHandle;
use crate::modal::ModalGate;
use crate::program::Program;

use super::scope::Scope;
use super::state::StateCell;

/// A closure queued for execution on the worker thread.
pub(crate) type ActionFn =
    Box<dyn for<'a> FnOnce(&mut Scope<'a>) -> Result<(), ActionError> + Send>;

/// Messages accepted by the worker loop.
pub(crate) enum WorkerAction {
    /// Run a user-supplied closure against the engine.
    Invoke(ActionFn),
    /// Run the program's periodic tick hook.
    Heartbeat,
    /// Run the pause hook and report the outcome.
    Pause {
        ack: oneshot::Sender<Result<(), ActionError>>,
    },
    /// Leave the serve loop, tear the engine down, then acknowledge.
    Stop { ack: oneshot::Sender<()> },
}

/// Cloneable sender half of the worker queue.
#[derive(Clone)]
pub(crate) struct WorkerHandle {
    tx: mpsc::UnboundedSender<WorkerAction>,
}

impl WorkerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<WorkerAction>) -> Self {
        Self { tx }
    }

    /// Enqueues an action; fails once the worker thread has exited.
    pub(crate) fn post(&self, action: WorkerAction) -> Result<(), BridgeError> {
        self.tx.send(action).map_err(|_| BridgeError::WorkerGone)
    }

    pub(crate) fn post_heartbeat(&self) -> Result<(), BridgeError> {
        self.post(WorkerAction::Heartbeat)
    }
}

/// Everything the worker thread needs, moved onto the thread at spawn.
pub(crate) struct Worker {
    pub(crate) rx: mpsc::UnboundedReceiver<WorkerAction>,
    pub(crate) loader: Box<dyn EngineLoader>,
    pub(crate) program: Box<dyn Program>,
    pub(crate) front: FrontHandle,
    pub(crate) bus: Bus,
    pub(crate) state: Arc<StateCell>,
    pub(crate) gate: Arc<ModalGate>,
    pub(crate) cfg: Config,
}

impl Worker {
    /// Thread entry point: bring the engine up, report readiness, then
    /// serve the queue until a stop arrives.
    pub(crate) fn run(mut self, ready: oneshot::Sender<Result<(), BridgeError>>) {
        match self.bring_up() {
            Ok(engine) => {
                let _ = ready.send(Ok(()));
                self.serve(engine);
            }
            Err(err) => {
                let _ = ready.send(Err(err));
            }
        }
    }

    fn bring_up(&mut self) -> Result<Box<dyn Engine>, BridgeError> {
        self.bus.publish(Event::new(EventKind::BringUpStarted));
        self.front.show_busy("Initialising...");

        let result = self
            .loader
            .initialize(&self.cfg.paths)
            .map_err(ActionError::from)
            .and_then(|mut engine| {
                let mut scope = Scope {
                    engine: engine.as_mut(),
                    front: &self.front,
                    gate: self.gate.as_ref(),
                    bus: &self.bus,
                    state: self.state.as_ref(),
                };
                self.program.bring_up(&mut scope)?;
                Ok(engine)
            });

        self.front.hide_busy();
        match result {
            Ok(engine) => {
                self.bus.publish(Event::new(EventKind::BringUpSucceeded));
                Ok(engine)
            }
            Err(fault) => {
                self.front.show_notice(&fault.to_string());
                self.bus.publish(
                    Event::new(EventKind::BringUpFailed).with_reason(fault.to_string()),
                );
                Err(BridgeError::BringUp { fault })
            }
        }
    }

    fn serve(self, mut engine: Box<dyn Engine>) {
        let Worker {
            mut rx,
            loader: _,
            mut program,
            front,
            bus,
            state,
            gate,
            cfg,
        } = self;

        let mut stop_ack = None;
        while let Some(action) = rx.blocking_recv() {
            match action {
                WorkerAction::Invoke(f) => {
                    let mut scope = Scope {
                        engine: engine.as_mut(),
                        front: &front,
                        gate: gate.as_ref(),
                        bus: &bus,
                        state: state.as_ref(),
                    };
                    match panic::catch_unwind(AssertUnwindSafe(|| f(&mut scope))) {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => bus.publish(
                            Event::new(EventKind::ActionFailed).with_reason(e.to_string()),
                        ),
                        Err(_) => bus.publish(
                            Event::new(EventKind::ActionFailed).with_reason("action panicked"),
                        ),
                    }
                }
                WorkerAction::Heartbeat => {
                    let mut scope = Scope {
                        engine: engine.as_mut(),
                        front: &front,
                        gate: gate.as_ref(),
                        bus: &bus,
                        state: state.as_ref(),
                    };
                    match panic::catch_unwind(AssertUnwindSafe(|| program.heartbeat(&mut scope))) {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => bus.publish(
                            Event::new(EventKind::ActionFailed).with_reason(e.to_string()),
                        ),
                        Err(_) => bus.publish(
                            Event::new(EventKind::ActionFailed)
                                .with_reason("heartbeat hook panicked"),
                        ),
                    }
                }
                WorkerAction::Pause { ack } => {
                    let mut scope = Scope {
                        engine: engine.as_mut(),
                        front: &front,
                        gate: gate.as_ref(),
                        bus: &bus,
                        state: state.as_ref(),
                    };
                    let outcome =
                        match panic::catch_unwind(AssertUnwindSafe(|| program.pause(&mut scope))) {
                            Ok(res) => res,
                            Err(_) => Err(ActionError::Failed {
                                reason: "pause hook panicked".into(),
                            }),
                        };
                    let _ = ack.send(outcome);
                }
                WorkerAction::Stop { ack } => {
                    stop_ack = Some(ack);
                    break;
                }
            }
        }

        // Teardown runs only for an explicit stop. If the queue closed
        // because the supervisor was dropped, the engine is released on
        // thread exit without the shutdown hook.
        if let Some(ack) = stop_ack {
            let mut scope = Scope {
                engine: engine.as_mut(),
                front: &front,
                gate: gate.as_ref(),
                bus: &bus,
                state: state.as_ref(),
            };
            match panic::catch_unwind(AssertUnwindSafe(|| program.shut_down(&mut scope))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => bus
                    .publish(Event::new(EventKind::ActionFailed).with_reason(e.to_string())),
                Err(_) => bus.publish(
                    Event::new(EventKind::ActionFailed).with_reason("shutdown hook panicked"),
                ),
            }

            // Let the engine flush queued internal callbacks, bounded by
            // the drain budget so a misbehaving engine cannot wedge stop.
            let started = Instant::now();
            let deadline = started + cfg.drain_budget;
            let mut drained = false;
            loop {
                if !engine.drain_pending_once() {
                    drained = true;
                    break;
                }
                if Instant::now() >= deadline {
                    break;
                }
                engine.drain_blocking(cfg.drain_cycle_clamped());
            }
            let elapsed = started.elapsed();
            let kind = if drained {
                EventKind::DrainCompleted
            } else {
                EventKind::DrainTimedOut
            };
            bus.publish(Event::new(kind).with_elapsed(elapsed));

            drop(engine);
            bus.publish(Event::new(EventKind::EngineReleased));
            let _ = ack.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_fails_after_receiver_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle::new(tx);
        drop(rx);
        assert!(matches!(
            handle.post_heartbeat(),
            Err(BridgeError::WorkerGone)
        ));
    }
}
