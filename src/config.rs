//! # Global bridge configuration.
//!
//! Provides [`Config`] centralized settings for the bridge runtime.
//!
//! Config is passed once to [`Bridge::new`](crate::Bridge::new). All fields
//! are public for flexibility; prefer the helper accessors over sprinkling
//! sentinel checks across the codebase.

use std::time::Duration;

use crate::engine::EnginePaths;

/// Global configuration for the bridge runtime.
///
/// ## Field semantics
/// - `heartbeat_interval`: cadence of worker-side upkeep ticks
/// - `drain_budget`: maximum total wait for the engine's internal queue to
///   empty during shutdown; after the budget the engine is released anyway
/// - `drain_cycle`: blocking wait per drain poll cycle
/// - `grace`: maximum wait for the worker to acknowledge the stop action
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus)
/// - `paths`: core/search paths handed to [`EngineLoader::initialize`](crate::EngineLoader::initialize)
#[derive(Clone, Debug)]
pub struct Config {
    /// Interval between heartbeat ticks posted to the worker queue.
    ///
    /// The first tick fires immediately when the heartbeat is armed. A tick
    /// handler slower than the interval never causes overlapping ticks; the
    /// next tick simply queues behind it.
    pub heartbeat_interval: Duration,

    /// Maximum total time spent draining the engine's internal queue during
    /// shutdown.
    ///
    /// When exceeded, shutdown proceeds and releases the engine, accepting
    /// possible loss of the engine's unflushed internal state.
    pub drain_budget: Duration,

    /// Blocking wait per drain poll cycle while the engine still reports
    /// pending work.
    pub drain_cycle: Duration,

    /// Maximum time [`Bridge::stop`](crate::Bridge::stop) waits for the
    /// worker to finish the drain and exit.
    ///
    /// When exceeded, `stop` returns [`BridgeError::GraceExceeded`](crate::BridgeError::GraceExceeded)
    /// and the state remains `Stopping`.
    pub grace: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip
    /// older items. Minimum value is 1 (enforced by the Bus).
    pub bus_capacity: usize,

    /// Engine core/search paths resolved by the host before start.
    pub paths: EnginePaths,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the drain cycle wait clamped to a minimum of 1ms.
    ///
    /// A zero cycle would turn the bounded drain loop into a busy spin.
    #[inline]
    pub fn drain_cycle_clamped(&self) -> Duration {
        self.drain_cycle.max(Duration::from_millis(1))
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `heartbeat_interval = 5s`
    /// - `drain_budget = 2s`
    /// - `drain_cycle = 10ms`
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    /// - `paths = EnginePaths::default()` (empty)
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            drain_budget: Duration::from_secs(2),
            drain_cycle: Duration::from_millis(10),
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
            paths: EnginePaths::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(cfg.drain_cycle, Duration::from_millis(10));
        assert!(cfg.bus_capacity >= 1);
        assert!(cfg.paths.core.is_empty() && cfg.paths.search.is_empty());
    }

    #[test]
    fn clamped_accessors() {
        let cfg = Config {
            bus_capacity: 0,
            drain_cycle: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.drain_cycle_clamped(), Duration::from_millis(1));
    }
}
