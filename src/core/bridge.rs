//! # Bridge: the lifecycle supervisor.
//!
//! [`Bridge`] is the host-facing entry point. It owns the wiring between
//! the front context, the worker thread, the heartbeat and the event bus,
//! and it is the **only** component that mutates the lifecycle state. The
//! worker reports outcomes back over oneshot acknowledgements; the
//! supervisor turns them into transitions.
//!
//! ## Rules
//! - `start` consumes the boot payload; a second `start` is rejected as an
//!   invalid transition even after a failed first attempt.
//! - `stop` cancels the heartbeat and force-releases a pending modal query
//!   **before** posting the stop action, so the worker cannot be stuck
//!   behind a question nobody will answer.
//! - Every lifecycle entry point leaves the state either advanced or
//!   exactly where it found it.

use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time;

use crate::config::Config;
use crate::engine::EngineLoader;
use crate::error::{ActionError, BridgeError};
use crate::events::{Bus, Event, EventKind};
use crate::front::{self, FrontAction, FrontHandle, Frontend};
use crate::modal::ModalGate;
use crate::program::Program;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::heartbeat::Heartbeat;
use super::scope::Scope;
use super::state::{LifecycleState, StateCell};
use super::worker::{Worker, WorkerAction, WorkerHandle};

/// Everything `start` needs exactly once, parked here between `new` and
/// `start` so `new` stays runtime-free.
struct Boot {
    loader: Box<dyn EngineLoader>,
    program: Box<dyn Program>,
    frontend: Arc<dyn Frontend>,
    front_rx: mpsc::UnboundedReceiver<FrontAction>,
    worker_rx: mpsc::UnboundedReceiver<WorkerAction>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

/// Lifecycle supervisor for one engine worker.
///
/// Cheap to share behind an `Arc`; all entry points take `&self`. Dropping
/// the bridge without calling [`stop`](Bridge::stop) closes the worker
/// queue, which releases the engine on the worker thread without running
/// the program's shutdown hook or the drain.
pub struct Bridge {
    cfg: Config,
    bus: Bus,
    state: Arc<StateCell>,
    worker: WorkerHandle,
    front: FrontHandle,
    gate: Arc<ModalGate>,
    heartbeat: Mutex<Option<Heartbeat>>,
    boot: Mutex<Option<Boot>>,
    join: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Bridge {
    /// Creates an unstarted bridge.
    ///
    /// Does not spawn anything; safe to call outside a tokio runtime.
    /// Actions may be posted immediately and queue up until the worker
    /// finishes bring-up.
    pub fn new(
        cfg: Config,
        loader: Box<dyn EngineLoader>,
        program: Box<dyn Program>,
        frontend: Arc<dyn Frontend>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (front, front_rx) = front::channel();
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();

        Self {
            cfg,
            bus,
            state: Arc::new(StateCell::new()),
            worker: WorkerHandle::new(worker_tx),
            front,
            gate: Arc::new(ModalGate::new()),
            heartbeat: Mutex::new(None),
            boot: Mutex::new(Some(Boot {
                loader,
                program,
                frontend,
                front_rx,
                worker_rx,
                subscribers,
            })),
            join: Mutex::new(None),
        }
    }

    /// Current lifecycle state (informational; may change between reads).
    pub fn state(&self) -> LifecycleState {
        self.state.load()
    }

    /// Subscribes to the raw event stream.
    ///
    /// The receiver only observes events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Starts the bridge: spawns the front runner and the worker thread,
    /// waits for engine bring-up, then arms the heartbeat.
    ///
    /// `Uninitialized -> Starting -> Running` on success. On a bring-up
    /// fault the state moves to `Stopped` and the fault is returned; the
    /// bridge cannot be started again.
    pub async fn start(&self) -> Result<(), BridgeError> {
        self.state
            .transition(LifecycleState::Uninitialized, LifecycleState::Starting)?;

        // The transition above admits exactly one caller, so the boot
        // payload is present here.
        let boot = self
            .boot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(BridgeError::WorkerGone)?;

        front::spawn_front_runner(boot.frontend, boot.front_rx);
        if !boot.subscribers.is_empty() {
            spawn_bus_listener(self.bus.subscribe(), SubscriberSet::new(boot.subscribers));
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let worker = Worker {
            rx: boot.worker_rx,
            loader: boot.loader,
            program: boot.program,
            front: self.front.clone(),
            bus: self.bus.clone(),
            state: Arc::clone(&self.state),
            gate: Arc::clone(&self.gate),
            cfg: self.cfg.clone(),
        };

        let spawned = thread::Builder::new()
            .name("bridge-worker".into())
            .spawn(move || worker.run(ready_tx));
        let join = match spawned {
            Ok(join) => join,
            Err(_) => {
                let _ = self
                    .state
                    .transition(LifecycleState::Starting, LifecycleState::Stopped);
                return Err(BridgeError::WorkerGone);
            }
        };
        *self.join.lock().unwrap_or_else(|e| e.into_inner()) = Some(join);

        match ready_rx.await {
            Ok(Ok(())) => {
                self.state
                    .transition(LifecycleState::Starting, LifecycleState::Running)?;
                let hb = Heartbeat::arm(
                    self.cfg.heartbeat_interval,
                    self.worker.clone(),
                    self.bus.clone(),
                );
                *self.heartbeat.lock().unwrap_or_else(|e| e.into_inner()) = Some(hb);
                Ok(())
            }
            Ok(Err(err)) => {
                self.join_worker().await;
                let _ = self
                    .state
                    .transition(LifecycleState::Starting, LifecycleState::Stopped);
                Err(err)
            }
            Err(_) => {
                self.join_worker().await;
                let _ = self
                    .state
                    .transition(LifecycleState::Starting, LifecycleState::Stopped);
                Err(BridgeError::WorkerGone)
            }
        }
    }

    /// Enqueues an action for the worker context.
    ///
    /// Non-blocking; the action runs in FIFO order with everything else on
    /// the worker queue. Rejected once a stop has been requested.
    pub fn post<F>(&self, f: F) -> Result<(), BridgeError>
    where
        F: for<'a> FnOnce(&mut Scope<'a>) -> Result<(), ActionError> + Send + 'static,
    {
        match self.state.load() {
            LifecycleState::Stopping | LifecycleState::Stopped => Err(BridgeError::WorkerGone),
            _ => self.worker.post(WorkerAction::Invoke(Box::new(f))),
        }
    }

    /// Pauses the bridge: `Running -> Pausing -> Paused`.
    ///
    /// The program's pause hook runs on the worker, behind everything
    /// already queued. If the hook faults the state reverts to `Running`.
    /// The heartbeat keeps running while paused; tick handlers observe the
    /// paused state through [`Scope::state`].
    pub async fn pause(&self) -> Result<(), BridgeError> {
        self.state
            .transition(LifecycleState::Running, LifecycleState::Pausing)?;
        self.bus.publish(Event::new(EventKind::PauseRequested));

        let (ack_tx, ack_rx) = oneshot::channel();
        if let Err(err) = self.worker.post(WorkerAction::Pause { ack: ack_tx }) {
            let _ = self
                .state
                .transition(LifecycleState::Pausing, LifecycleState::Running);
            return Err(err);
        }

        match ack_rx.await {
            Ok(Ok(())) => {
                self.state
                    .transition(LifecycleState::Pausing, LifecycleState::Paused)?;
                self.bus.publish(
                    Event::new(EventKind::Paused).with_state(LifecycleState::Paused),
                );
                Ok(())
            }
            Ok(Err(fault)) => {
                let _ = self
                    .state
                    .transition(LifecycleState::Pausing, LifecycleState::Running);
                Err(BridgeError::PauseFailed { fault })
            }
            Err(_) => {
                let _ = self
                    .state
                    .transition(LifecycleState::Pausing, LifecycleState::Running);
                Err(BridgeError::WorkerGone)
            }
        }
    }

    /// Stops the bridge: `Running | Paused -> Stopping -> Stopped`.
    ///
    /// Cancels the heartbeat (no tick is posted after that point),
    /// force-releases any pending modal query, then posts the stop action.
    /// The worker runs the shutdown hook, drains the engine within the
    /// drain budget and releases it. Waits up to the grace period for the
    /// worker to acknowledge; past it, returns
    /// [`BridgeError::GraceExceeded`] with the state left at `Stopping`.
    pub async fn stop(&self) -> Result<(), BridgeError> {
        self.state.transition_from(
            &[LifecycleState::Running, LifecycleState::Paused],
            LifecycleState::Stopping,
        )?;
        self.bus.publish(Event::new(EventKind::StopRequested));

        let hb = self
            .heartbeat
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(hb) = hb {
            hb.cancel(&self.bus).await;
        }

        // A worker blocked inside Scope::ask resumes with a cancelled
        // answer and reaches the stop action behind it. The gate also
        // latches closed, so a question raised by an action still running
        // at this point resolves immediately instead of parking forever.
        self.gate.cancel_pending();

        let (ack_tx, ack_rx) = oneshot::channel();
        self.worker.post(WorkerAction::Stop { ack: ack_tx })?;

        match time::timeout(self.cfg.grace, ack_rx).await {
            Ok(_) => {
                self.join_worker().await;
                self.state
                    .transition(LifecycleState::Stopping, LifecycleState::Stopped)?;
                self.bus.publish(
                    Event::new(EventKind::Stopped).with_state(LifecycleState::Stopped),
                );
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                Err(BridgeError::GraceExceeded {
                    grace: self.cfg.grace,
                })
            }
        }
    }

    /// Blocks until a shutdown signal arrives, then stops the bridge.
    ///
    /// On unix this listens for `SIGINT`, `SIGTERM` and `SIGQUIT`;
    /// elsewhere for ctrl-c only.
    pub async fn run_until_shutdown_signal(&self) -> Result<(), BridgeError> {
        wait_for_shutdown_signal().await;
        self.stop().await
    }

    async fn join_worker(&self) {
        let join = self.join.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(join) = join {
            let _ = tokio::task::spawn_blocking(move || join.join()).await;
        }
    }

}

/// Forwards bus events into the subscriber set until the bus closes.
fn spawn_bus_listener(mut rx: broadcast::Receiver<Event>, set: SubscriberSet) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let term = signal(SignalKind::terminate());
    let quit = signal(SignalKind::quit());
    match (term, quit) {
        (Ok(mut term), Ok(mut quit)) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
                _ = quit.recv() => {}
            }
        }
        _ => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineFault, EnginePaths, EngineValue, ModuleRef};
    use crate::modal::ModalResponder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockEngine {
        pending: usize,
        endless: bool,
        dropped: Arc<AtomicUsize>,
    }

    impl Engine for MockEngine {
        fn import_module(&mut self, _path: &str) -> Result<ModuleRef, EngineFault> {
            Ok(ModuleRef::new(1))
        }

        fn call(
            &mut self,
            _module: &ModuleRef,
            _function: &str,
            _args: &[EngineValue],
        ) -> Result<EngineValue, EngineFault> {
            Ok(EngineValue::Unit)
        }

        fn drain_pending_once(&mut self) -> bool {
            if self.endless {
                return true;
            }
            if self.pending > 0 {
                self.pending -= 1;
                return true;
            }
            false
        }

        fn drain_blocking(&mut self, wait: Duration) {
            thread::sleep(wait.min(Duration::from_millis(1)));
        }
    }

    impl Drop for MockEngine {
        fn drop(&mut self) {
            self.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct MockLoader {
        fail: bool,
        pending: usize,
        endless: bool,
        initialized: Arc<AtomicUsize>,
        dropped: Arc<AtomicUsize>,
    }

    impl MockLoader {
        fn ok() -> Self {
            Self {
                fail: false,
                pending: 0,
                endless: false,
                initialized: Arc::new(AtomicUsize::new(0)),
                dropped: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl EngineLoader for MockLoader {
        fn initialize(&mut self, _paths: &EnginePaths) -> Result<Box<dyn Engine>, EngineFault> {
            self.initialized.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EngineFault::Initialize {
                    reason: "library missing".into(),
                });
            }
            Ok(Box::new(MockEngine {
                pending: self.pending,
                endless: self.endless,
                dropped: Arc::clone(&self.dropped),
            }))
        }
    }

    struct TestProgram {
        ticks: Arc<AtomicUsize>,
        pauses: Arc<AtomicUsize>,
        fail_pause: bool,
    }

    impl TestProgram {
        fn quiet() -> Self {
            Self {
                ticks: Arc::new(AtomicUsize::new(0)),
                pauses: Arc::new(AtomicUsize::new(0)),
                fail_pause: false,
            }
        }
    }

    impl Program for TestProgram {
        fn bring_up(&mut self, _scope: &mut Scope<'_>) -> Result<(), ActionError> {
            Ok(())
        }

        fn heartbeat(&mut self, _scope: &mut Scope<'_>) -> Result<(), ActionError> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self, _scope: &mut Scope<'_>) -> Result<(), ActionError> {
            self.pauses.fetch_add(1, Ordering::SeqCst);
            if self.fail_pause {
                return Err(ActionError::Failed {
                    reason: "state flush failed".into(),
                });
            }
            Ok(())
        }
    }

    struct NullFrontend;

    #[async_trait]
    impl Frontend for NullFrontend {}

    /// Answers every modal question with a fixed choice, or parks the
    /// responder for the test to inspect when no choice is configured.
    struct ModalFrontend {
        auto_answer: Option<usize>,
        parked: Arc<Mutex<Option<ModalResponder>>>,
        presented_tx: Mutex<Option<oneshot::Sender<()>>>,
    }

    #[async_trait]
    impl Frontend for ModalFrontend {
        async fn present_modal(
            &self,
            _prompt: &str,
            _choices: &[String],
            responder: ModalResponder,
        ) {
            match self.auto_answer {
                Some(choice) => responder.answer(choice),
                None => {
                    *self.parked.lock().unwrap() = Some(responder);
                }
            }
            if let Some(tx) = self.presented_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
    }

    fn test_cfg() -> Config {
        Config {
            // Long enough that only the immediate first tick can land
            // unless a test lowers it.
            heartbeat_interval: Duration::from_secs(3600),
            drain_budget: Duration::from_millis(200),
            drain_cycle: Duration::from_millis(1),
            grace: Duration::from_secs(5),
            bus_capacity: 64,
            paths: EnginePaths::default(),
        }
    }

    fn bridge_with(cfg: Config, loader: MockLoader, program: TestProgram) -> Bridge {
        Bridge::new(
            cfg,
            Box::new(loader),
            Box::new(program),
            Arc::new(NullFrontend),
            Vec::new(),
        )
    }

    fn drain_kinds(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn actions_run_in_posting_order() {
        let bridge = bridge_with(test_cfg(), MockLoader::ok(), TestProgram::quiet());
        bridge.start().await.unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..16 {
            let log = Arc::clone(&log);
            bridge
                .post(move |_scope: &mut Scope<'_>| {
                    log.lock().unwrap().push(i);
                    Ok(())
                })
                .unwrap();
        }
        let (done_tx, done_rx) = oneshot::channel();
        bridge
            .post(move |_scope: &mut Scope<'_>| {
                let _ = done_tx.send(());
                Ok(())
            })
            .unwrap();
        done_rx.await.unwrap();

        assert_eq!(*log.lock().unwrap(), (0..16).collect::<Vec<_>>());
        bridge.stop().await.unwrap();
    }

    #[tokio::test]
    async fn bring_up_failure_moves_to_stopped() {
        let loader = MockLoader {
            fail: true,
            ..MockLoader::ok()
        };
        let initialized = Arc::clone(&loader.initialized);
        let bridge = bridge_with(test_cfg(), loader, TestProgram::quiet());

        let err = bridge.start().await.unwrap_err();
        assert!(matches!(err, BridgeError::BringUp { .. }));
        assert_eq!(bridge.state(), LifecycleState::Stopped);

        // No retry in the same process lifetime.
        let err = bridge.start().await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidTransition { .. }));
        assert_eq!(initialized.load(Ordering::SeqCst), 1);

        // And the queue is closed for new work.
        assert!(matches!(
            bridge.post(|_scope: &mut Scope<'_>| Ok(())),
            Err(BridgeError::WorkerGone)
        ));
    }

    #[tokio::test]
    async fn pause_before_start_is_rejected() {
        let bridge = bridge_with(test_cfg(), MockLoader::ok(), TestProgram::quiet());
        let err = bridge.pause().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::InvalidTransition {
                found: LifecycleState::Uninitialized,
                ..
            }
        ));
        assert_eq!(bridge.state(), LifecycleState::Uninitialized);
    }

    #[tokio::test]
    async fn heartbeat_drives_program_and_stop_freezes_it() {
        let mut cfg = test_cfg();
        cfg.heartbeat_interval = Duration::from_millis(20);
        let loader = MockLoader::ok();
        let dropped = Arc::clone(&loader.dropped);
        let program = TestProgram::quiet();
        let ticks = Arc::clone(&program.ticks);
        let bridge = bridge_with(cfg, loader, program);

        bridge.start().await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert!(ticks.load(Ordering::SeqCst) >= 1);

        bridge.stop().await.unwrap();
        assert_eq!(bridge.state(), LifecycleState::Stopped);
        assert_eq!(dropped.load(Ordering::SeqCst), 1);

        let frozen = ticks.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), frozen);
    }

    #[tokio::test]
    async fn pause_runs_hook_then_stop_from_paused() {
        let program = TestProgram::quiet();
        let pauses = Arc::clone(&program.pauses);
        let bridge = bridge_with(test_cfg(), MockLoader::ok(), program);

        bridge.start().await.unwrap();
        bridge.pause().await.unwrap();
        assert_eq!(bridge.state(), LifecycleState::Paused);
        assert_eq!(pauses.load(Ordering::SeqCst), 1);

        bridge.stop().await.unwrap();
        assert_eq!(bridge.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn pause_fault_reverts_to_running() {
        let program = TestProgram {
            fail_pause: true,
            ..TestProgram::quiet()
        };
        let bridge = bridge_with(test_cfg(), MockLoader::ok(), program);

        bridge.start().await.unwrap();
        let err = bridge.pause().await.unwrap_err();
        assert!(matches!(err, BridgeError::PauseFailed { .. }));
        assert_eq!(bridge.state(), LifecycleState::Running);

        bridge.stop().await.unwrap();
    }

    #[tokio::test]
    async fn ask_blocks_the_worker_but_not_the_front() {
        let frontend = Arc::new(ModalFrontend {
            auto_answer: Some(2),
            parked: Arc::new(Mutex::new(None)),
            presented_tx: Mutex::new(None),
        });
        let bridge = Bridge::new(
            test_cfg(),
            Box::new(MockLoader::ok()),
            Box::new(TestProgram::quiet()),
            frontend,
            Vec::new(),
        );
        bridge.start().await.unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let asked = Arc::clone(&log);
        bridge
            .post(move |scope: &mut Scope<'_>| {
                let choice = scope.ask("Upgrade the database?", &["yes", "no", "later"])?;
                asked.lock().unwrap().push(format!("ask:{choice}"));
                Ok(())
            })
            .unwrap();

        let behind = Arc::clone(&log);
        let (done_tx, done_rx) = oneshot::channel();
        bridge
            .post(move |_scope: &mut Scope<'_>| {
                behind.lock().unwrap().push("second".to_string());
                let _ = done_tx.send(());
                Ok(())
            })
            .unwrap();
        done_rx.await.unwrap();

        // The second action queued behind the blocked ask.
        assert_eq!(*log.lock().unwrap(), vec!["ask:2", "second"]);
        bridge.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_force_releases_a_pending_ask() {
        let parked = Arc::new(Mutex::new(None));
        let (presented_tx, presented_rx) = oneshot::channel();
        let frontend = Arc::new(ModalFrontend {
            auto_answer: None,
            parked: Arc::clone(&parked),
            presented_tx: Mutex::new(Some(presented_tx)),
        });
        let bridge = Bridge::new(
            test_cfg(),
            Box::new(MockLoader::ok()),
            Box::new(TestProgram::quiet()),
            frontend,
            Vec::new(),
        );
        bridge.start().await.unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&log);
        bridge
            .post(move |scope: &mut Scope<'_>| {
                match scope.ask("Continue?", &["ok"]) {
                    Err(ActionError::ModalCancelled) => {
                        seen.lock().unwrap().push("cancelled");
                        Ok(())
                    }
                    other => {
                        seen.lock().unwrap().push("unexpected");
                        other.map(|_| ())
                    }
                }
            })
            .unwrap();

        // Wait until the worker is actually blocked on the question.
        presented_rx.await.unwrap();
        bridge.stop().await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["cancelled"]);
        assert_eq!(bridge.state(), LifecycleState::Stopped);

        // A late answer through the parked responder is a silent no-op.
        let late = parked.lock().unwrap().take();
        if let Some(responder) = late {
            responder.answer(0);
        }
    }

    #[tokio::test]
    async fn stop_cancels_an_ask_issued_after_stop_began() {
        let parked = Arc::new(Mutex::new(None));
        let frontend = Arc::new(ModalFrontend {
            auto_answer: None,
            parked: Arc::clone(&parked),
            presented_tx: Mutex::new(None),
        });
        let bridge = Bridge::new(
            test_cfg(),
            Box::new(MockLoader::ok()),
            Box::new(TestProgram::quiet()),
            frontend,
            Vec::new(),
        );
        bridge.start().await.unwrap();

        // The action is already running when the stop lands; its question
        // registers against a gate the shutdown has closed.
        let log = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&log);
        let (started_tx, started_rx) = oneshot::channel();
        bridge
            .post(move |scope: &mut Scope<'_>| {
                let _ = started_tx.send(());
                thread::sleep(Duration::from_millis(150));
                match scope.ask("Really quit?", &["ok"]) {
                    Err(ActionError::ModalCancelled) => {
                        seen.lock().unwrap().push("cancelled");
                        Ok(())
                    }
                    _ => {
                        seen.lock().unwrap().push("unexpected");
                        Ok(())
                    }
                }
            })
            .unwrap();

        started_rx.await.unwrap();
        bridge.stop().await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["cancelled"]);
        assert_eq!(bridge.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn drain_completes_when_engine_queue_empties() {
        let loader = MockLoader {
            pending: 3,
            ..MockLoader::ok()
        };
        let bridge = bridge_with(test_cfg(), loader, TestProgram::quiet());
        bridge.start().await.unwrap();

        let mut rx = bridge.subscribe();
        bridge.stop().await.unwrap();

        let kinds = drain_kinds(&mut rx);
        assert!(kinds.contains(&EventKind::DrainCompleted));
        assert!(kinds.contains(&EventKind::EngineReleased));
        assert!(!kinds.contains(&EventKind::DrainTimedOut));
    }

    #[tokio::test]
    async fn drain_budget_bounds_a_wedged_engine() {
        let mut cfg = test_cfg();
        cfg.drain_budget = Duration::from_millis(50);
        let loader = MockLoader {
            endless: true,
            ..MockLoader::ok()
        };
        let dropped = Arc::clone(&loader.dropped);
        let bridge = bridge_with(cfg, loader, TestProgram::quiet());
        bridge.start().await.unwrap();

        let mut rx = bridge.subscribe();
        bridge.stop().await.unwrap();

        let kinds = drain_kinds(&mut rx);
        assert!(kinds.contains(&EventKind::DrainTimedOut));
        assert!(kinds.contains(&EventKind::EngineReleased));
        // The engine is released even though it never drained.
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn grace_exceeded_leaves_state_stopping() {
        let mut cfg = test_cfg();
        cfg.grace = Duration::from_millis(50);
        let bridge = bridge_with(cfg, MockLoader::ok(), TestProgram::quiet());
        bridge.start().await.unwrap();

        bridge
            .post(|_scope: &mut Scope<'_>| {
                thread::sleep(Duration::from_millis(400));
                Ok(())
            })
            .unwrap();

        let err = bridge.stop().await.unwrap_err();
        assert!(matches!(err, BridgeError::GraceExceeded { .. }));
        assert_eq!(bridge.state(), LifecycleState::Stopping);
    }

    #[tokio::test]
    async fn action_fault_is_reported_and_worker_continues() {
        let bridge = bridge_with(test_cfg(), MockLoader::ok(), TestProgram::quiet());
        bridge.start().await.unwrap();
        let mut rx = bridge.subscribe();

        bridge
            .post(|_scope: &mut Scope<'_>| {
                Err(ActionError::Failed {
                    reason: "corrupt card".into(),
                })
            })
            .unwrap();

        let (done_tx, done_rx) = oneshot::channel();
        bridge
            .post(move |_scope: &mut Scope<'_>| {
                let _ = done_tx.send(());
                Ok(())
            })
            .unwrap();
        done_rx.await.unwrap();

        let kinds = drain_kinds(&mut rx);
        assert!(kinds.contains(&EventKind::ActionFailed));
        bridge.stop().await.unwrap();
    }

    #[tokio::test]
    async fn panicking_action_does_not_kill_the_worker() {
        let bridge = bridge_with(test_cfg(), MockLoader::ok(), TestProgram::quiet());
        bridge.start().await.unwrap();
        let mut rx = bridge.subscribe();

        bridge
            .post(|_scope: &mut Scope<'_>| panic!("host bug"))
            .unwrap();

        let (done_tx, done_rx) = oneshot::channel();
        bridge
            .post(move |_scope: &mut Scope<'_>| {
                let _ = done_tx.send(());
                Ok(())
            })
            .unwrap();
        done_rx.await.unwrap();

        let kinds = drain_kinds(&mut rx);
        assert!(kinds.contains(&EventKind::ActionFailed));
        bridge.stop().await.unwrap();
        assert_eq!(bridge.state(), LifecycleState::Stopped);
    }
}
