//! Bridge core: orchestration and lifecycle.
//!
//! The only public API from this module is [`Bridge`] (plus the types its
//! signatures expose: [`LifecycleState`], [`Scope`]).
//!
//! Internal modules:
//! - [`state`]: the lifecycle state machine backed by an atomic cell;
//! - [`scope`]: what an executing worker action sees (engine, front, ask);
//! - [`heartbeat`]: armed/cancellable periodic tick poster;
//! - [`worker`]: the dedicated thread owning the engine, bring-up and drain;
//! - [`bridge`]: the supervisor wiring it all together.

mod bridge;
mod heartbeat;
mod scope;
mod state;
mod worker;

pub use bridge::Bridge;
pub use scope::Scope;
pub use state::LifecycleState;
