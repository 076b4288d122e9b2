//! # Embedded-engine boundary.
//!
//! The engine is an external collaborator: a single-threaded embedded
//! scripting runtime executing application logic. The bridge only ever
//! touches it through the traits defined here, and only from the worker
//! thread.
//!
//! ## Ownership rules
//! - [`EngineLoader::initialize`] is called exactly once, on the worker
//!   thread, as the first thing the worker does.
//! - The resulting `Box<dyn Engine>` is owned by the worker loop for its
//!   entire lifetime; no reference to it is ever handed to the front
//!   context.
//! - During shutdown the worker drains the engine's internal queue via
//!   [`Engine::drain_pending_once`] / [`Engine::drain_blocking`] and then
//!   drops the handle.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Core and search paths handed to the engine at initialization.
///
/// Resolved by the host before [`Bridge::start`](crate::Bridge::start);
/// the bridge treats them as opaque.
#[derive(Clone, Debug, Default)]
pub struct EnginePaths {
    /// Paths to the engine's own runtime artifacts.
    pub core: Vec<PathBuf>,
    /// Module search paths for script imports.
    pub search: Vec<PathBuf>,
}

/// Opaque handle to a module imported into the engine.
///
/// Minted by [`Engine::import_module`]; only meaningful to the engine that
/// produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleRef(u64);

impl ModuleRef {
    /// Creates a module handle with an engine-chosen identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the engine-chosen identifier.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Argument/result value for [`Engine::call`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineValue {
    /// No value (procedures).
    Unit,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// UTF-8 string.
    Str(String),
}

impl From<bool> for EngineValue {
    fn from(v: bool) -> Self {
        EngineValue::Bool(v)
    }
}

impl From<i64> for EngineValue {
    fn from(v: i64) -> Self {
        EngineValue::Int(v)
    }
}

impl From<&str> for EngineValue {
    fn from(v: &str) -> Self {
        EngineValue::Str(v.to_string())
    }
}

impl From<String> for EngineValue {
    fn from(v: String) -> Self {
        EngineValue::Str(v)
    }
}

/// # Faults raised at the engine boundary.
///
/// `Initialize` and `MissingArtifact` are bring-up faults: fatal to the
/// startup attempt. `Import` and `Call` are action-local faults recovered
/// by the worker loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EngineFault {
    /// One-time engine initialization failed.
    #[error("engine initialization failed: {reason}")]
    Initialize {
        /// The underlying failure message.
        reason: String,
    },

    /// A required engine artifact (native module, runtime library) is missing.
    #[error("missing engine artifact: {path}")]
    MissingArtifact {
        /// Path that could not be loaded.
        path: PathBuf,
    },

    /// A module import failed.
    #[error("failed to import module {module}: {reason}")]
    Import {
        /// Module path as given to `import_module`.
        module: String,
        /// The underlying failure message.
        reason: String,
    },

    /// A function call into the engine failed.
    #[error("engine call {function} failed: {reason}")]
    Call {
        /// Function name as given to `call`.
        function: String,
        /// The underlying failure message.
        reason: String,
    },
}

/// One-time factory for the engine handle.
///
/// Consumed on the worker thread during bring-up; implementations may carry
/// host state (native library paths, preloaded artifacts).
pub trait EngineLoader: Send + 'static {
    /// Performs the one-time, potentially slow, engine bring-up.
    ///
    /// Runs on the worker thread before any queued action is consumed.
    fn initialize(&mut self, paths: &EnginePaths) -> Result<Box<dyn Engine>, EngineFault>;
}

/// # The embedded engine handle.
///
/// All methods are invoked from the worker thread only; the single-writer
/// rule is enforced by construction.
pub trait Engine: Send + 'static {
    /// Imports a script module, returning an opaque handle to it.
    fn import_module(&mut self, path: &str) -> Result<ModuleRef, EngineFault>;

    /// Calls a function in a previously imported module.
    fn call(
        &mut self,
        module: &ModuleRef,
        function: &str,
        args: &[EngineValue],
    ) -> Result<EngineValue, EngineFault>;

    /// Dispatches one message from the engine's internal queue.
    ///
    /// Returns whether work remained afterwards. Used only by the shutdown
    /// drain loop.
    fn drain_pending_once(&mut self) -> bool;

    /// Blocks up to `wait` for one engine message cycle.
    ///
    /// Used between drain polls during shutdown.
    fn drain_blocking(&mut self, wait: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_ref_identity() {
        let a = ModuleRef::new(7);
        assert_eq!(a.id(), 7);
        assert_eq!(a, ModuleRef::new(7));
        assert_ne!(a, ModuleRef::new(8));
    }

    #[test]
    fn value_conversions() {
        assert_eq!(EngineValue::from(true), EngineValue::Bool(true));
        assert_eq!(EngineValue::from(3i64), EngineValue::Int(3));
        assert_eq!(EngineValue::from("x"), EngineValue::Str("x".into()));
    }
}
