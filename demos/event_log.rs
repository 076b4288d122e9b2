//! # Example: Event Log
//!
//! Attaches the built-in [`LogWriter`] subscriber and a custom counter
//! subscriber, then walks the bridge through its whole lifecycle so every
//! event shows up on stdout.
//!
//! Run with: `cargo run --example event_log --features logging`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridgevisor::{
    ActionError, Bridge, Config, Engine, EngineFault, EngineLoader, EnginePaths, EngineValue,
    Event, Frontend, LogWriter, ModuleRef, Program, Scope, Subscribe,
};

struct SilentEngine;

impl Engine for SilentEngine {
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
        false
    }

    fn drain_blocking(&mut self, _wait: Duration) {}
}

struct SilentLoader;

impl EngineLoader for SilentLoader {
    fn initialize(&mut self, _paths: &EnginePaths) -> Result<Box<dyn Engine>, EngineFault> {
        Ok(Box::new(SilentEngine))
    }
}

struct App;

impl Program for App {
    fn bring_up(&mut self, _scope: &mut Scope<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    fn heartbeat(&mut self, _scope: &mut Scope<'_>) -> Result<(), ActionError> {
        Ok(())
    }
}

struct Quiet;

#[async_trait]
impl Frontend for Quiet {}

/// Counts every event it sees.
struct Counter {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl Subscribe for Counter {
    async fn on_event(&self, _event: &Event) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seen = Arc::new(AtomicUsize::new(0));
    let cfg = Config {
        heartbeat_interval: Duration::from_millis(150),
        ..Config::default()
    };
    let bridge = Bridge::new(
        cfg,
        Box::new(SilentLoader),
        Box::new(App),
        Arc::new(Quiet),
        vec![
            Arc::new(LogWriter) as Arc<dyn Subscribe>,
            Arc::new(Counter {
                seen: Arc::clone(&seen),
            }),
        ],
    );

    bridge.start().await?;
    tokio::time::sleep(Duration::from_millis(400)).await;
    bridge.pause().await?;
    bridge.stop().await?;

    // Give the fan-out a beat to flush before the process exits.
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("observed {} events", seen.load(Ordering::Relaxed));
    Ok(())
}
