//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the supervisor, the worker loop,
//! the heartbeat, and the modal gate.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Bridge` (lifecycle transitions), the worker thread
//!   (bring-up, action faults, drain), the heartbeat task, `Scope::ask`.
//! - **Consumers**: the bridge's subscriber listener (fans out to
//!   [`SubscriberSet`](crate::SubscriberSet)) and any host-held receiver
//!   from [`Bridge::subscribe`](crate::Bridge::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
