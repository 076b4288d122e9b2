//! # bridgevisor
//!
//! **Bridgevisor** is a lifecycle and concurrency bridge between an
//! interactive front end and a background worker hosting an embedded
//! scripting engine.
//!
//! The front end must stay responsive while the worker performs blocking
//! initialization, periodic upkeep, and occasional synchronous user-input
//! requests. Bridgevisor provides the coordination fabric: two ordered
//! action queues, a dedicated worker thread that owns exclusive access to
//! the engine, a cancellable heartbeat, a blocking modal-query gate, and an
//! explicit start/pause/stop state machine.
//!
//! ## Architecture
//! ```text
//!   Host (any context)                    Front context (tokio task)
//!   ──────────────────                    ──────────────────────────
//!   Bridge::post(action) ─┐               front runner ──► Frontend impl
//!   Bridge::start/pause/  │                    ▲   (busy, question/answer,
//!          stop           │                    │    notice, modal, progress)
//!                         ▼                    │ FrontAction queue (FIFO)
//!               ┌───────────────────┐          │
//!               │  Worker queue     │   posts  │
//!               │  (FIFO, unbounded)│◄──┐      │
//!               └─────────┬─────────┘   │      │
//!                         ▼             │      │
//!               ┌───────────────────┐   │      │
//!               │  Worker thread    │───┴──────┘
//!               │  (owns the Engine)│
//!               │  bring-up, then   │──► Bus ──► SubscriberSet ──► Subscribe
//!               │  one action at a  │   (broadcast)  (per-sub queues)
//!               │  time             │
//!               └─────────▲─────────┘
//!                         │ Heartbeat ticks (tokio task, cancellable)
//! ```
//!
//! ## Lifecycle
//! ```text
//! Uninitialized ─start()─► Starting ─ok─► Running ─pause()─► Pausing ─ok─► Paused
//!                             │              │                              │
//!                             └─fault─► Stopped                             │
//!                                            └───────stop()─► Stopping ◄────┘
//!                                                                │
//!                                       drain engine, release ───┴──► Stopped
//! ```
//!
//! `Stopping → Stopped` is terminal; the engine cannot be reinitialized in
//! the same process lifetime.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use bridgevisor::{
//!     ActionError, Bridge, Config, Engine, EngineFault, EngineLoader, EnginePaths,
//!     EngineValue, Frontend, ModuleRef, Program, Scope,
//! };
//!
//! struct Loader;
//! impl EngineLoader for Loader {
//!     fn initialize(&mut self, _paths: &EnginePaths) -> Result<Box<dyn Engine>, EngineFault> {
//!         // bring up the embedded engine here
//!         # unimplemented!()
//!     }
//! }
//!
//! struct App;
//! impl Program for App {
//!     fn bring_up(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError> {
//!         let module = scope.engine().import_module("app/main")?;
//!         scope.engine().call(&module, "start", &[])?;
//!         Ok(())
//!     }
//!     fn heartbeat(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError> {
//!         let module = scope.engine().import_module("app/controller")?;
//!         scope.engine().call(&module, "heartbeat", &[EngineValue::Bool(false)])?;
//!         Ok(())
//!     }
//! }
//!
//! struct Ui;
//! impl Frontend for Ui {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Bridge::new(
//!         Config::default(),
//!         Box::new(Loader),
//!         Box::new(App),
//!         Arc::new(Ui),
//!         Vec::new(),
//!     );
//!     bridge.start().await?;
//!     bridge.post(|scope: &mut Scope<'_>| {
//!         let module = scope.engine().import_module("app/review")?;
//!         scope.engine().call(&module, "show_answer", &[])?;
//!         Ok(())
//!     })?;
//!     bridge.run_until_shutdown_signal().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod engine;
mod error;
mod events;
mod front;
mod modal;
mod program;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Bridge, LifecycleState, Scope};
pub use engine::{Engine, EngineFault, EngineLoader, EnginePaths, EngineValue, ModuleRef};
pub use error::{ActionError, BridgeError};
pub use events::{Bus, Event, EventKind};
pub use front::{FrontAction, FrontHandle, Frontend};
pub use modal::{ModalAnswer, ModalResponder};
pub use program::Program;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
