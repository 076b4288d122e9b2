//! # Example: Basic Session
//!
//! Brings up a fake in-memory engine, posts a few actions, asks the front
//! end a question, then stops cleanly.
//!
//! Run with: `cargo run --example basic_session`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridgevisor::{
    ActionError, Bridge, Config, Engine, EngineFault, EngineLoader, EnginePaths, EngineValue,
    Frontend, ModalResponder, ModuleRef, Program, Scope,
};

/// Fake engine that just echoes calls to stdout.
struct EchoEngine;

impl Engine for EchoEngine {
    fn import_module(&mut self, path: &str) -> Result<ModuleRef, EngineFault> {
        println!("[engine] import {path}");
        Ok(ModuleRef::new(1))
    }

    fn call(
        &mut self,
        _module: &ModuleRef,
        function: &str,
        _args: &[EngineValue],
    ) -> Result<EngineValue, EngineFault> {
        println!("[engine] call {function}");
        Ok(EngineValue::Unit)
    }

    fn drain_pending_once(&mut self) -> bool {
        false
    }

    fn drain_blocking(&mut self, _wait: Duration) {}
}

struct EchoLoader;

impl EngineLoader for EchoLoader {
    fn initialize(&mut self, _paths: &EnginePaths) -> Result<Box<dyn Engine>, EngineFault> {
        println!("[loader] bringing the engine up");
        Ok(Box::new(EchoEngine))
    }
}

struct App;

impl Program for App {
    fn bring_up(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError> {
        let main = scope.engine().import_module("app/main")?;
        scope.engine().call(&main, "start", &[])?;
        Ok(())
    }

    fn heartbeat(&mut self, scope: &mut Scope<'_>) -> Result<(), ActionError> {
        let ctl = scope.engine().import_module("app/controller")?;
        scope.engine().call(&ctl, "heartbeat", &[])?;
        Ok(())
    }
}

/// Console frontend that answers every question with the first choice.
struct Console;

#[async_trait]
impl Frontend for Console {
    async fn show_busy(&self, message: &str) {
        println!("[ui] busy: {message}");
    }

    async fn hide_busy(&self) {
        println!("[ui] busy dismissed");
    }

    async fn set_status(&self, text: &str) {
        println!("[ui] status: {text}");
    }

    async fn present_modal(&self, prompt: &str, choices: &[String], responder: ModalResponder) {
        println!("[ui] question: {prompt} {choices:?} -> answering '{}'", choices[0]);
        responder.answer(0);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config {
        heartbeat_interval: Duration::from_millis(200),
        ..Config::default()
    };
    let bridge = Bridge::new(
        cfg,
        Box::new(EchoLoader),
        Box::new(App),
        Arc::new(Console),
        Vec::new(),
    );

    bridge.start().await?;

    bridge.post(|scope: &mut Scope<'_>| {
        scope.front().set_status("session open");
        let review = scope.engine().import_module("app/review")?;
        scope.engine().call(&review, "show_question", &[])?;
        Ok(())
    })?;

    bridge.post(|scope: &mut Scope<'_>| {
        let choice = scope.ask("Upgrade the database?", &["yes", "no"])?;
        println!("[app] host picked choice {choice}");
        Ok(())
    })?;

    tokio::time::sleep(Duration::from_millis(500)).await;
    bridge.stop().await?;
    Ok(())
}
