//! # Event subscribers for the bridge runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver bridge events to host-defined handlers
//! (logging, metrics, UI status lines) without blocking the publishers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   worker / heartbeat / supervisor ─ publish(Event) ─► Bus
//!                                                        │
//!                                       bridge listener ─┘
//!                                                        │
//!                                              SubscriberSet::emit(&Event)
//!                                           ┌─────────┬─────────┐
//!                                           ▼         ▼         ▼
//!                                      [queue S1] [queue S2] [queue SN]
//!                                           ▼         ▼         ▼
//!                                      worker S1  worker S2  worker SN
//!                                           ▼         ▼         ▼
//!                                      on_event()  on_event()  on_event()
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
