//! RTF to Markdown conversion engines.
//!
//! The conversion itself is delegated to an external engine: either a
//! converter program run as a child process, or a conversion module compiled
//! to WebAssembly and hosted in an `extism` sandbox. Both are initialized
//! lazily on first use and at most once per process.

pub mod process;
pub mod wasm;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::{EngineConfig, EngineKind};

pub use process::ProcessEngine;
pub use wasm::WasmEngine;

/// What an engine produced for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutput {
    pub out: String,
    /// Diagnostics the engine printed while converting.
    #[serde(default)]
    pub log: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("conversion engine failed to initialize: {0}")]
    Init(String),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("conversion module call failed: {0}")]
    Call(String),
    #[error("conversion engine returned malformed output: {0}")]
    Decode(String),
}

/// An external RTF to Markdown converter.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Prepare the engine. Cheap after the first success; safe to call
    /// before every conversion and from concurrent requests.
    async fn init(&self) -> Result<(), EngineError>;

    /// Convert `input` with the engine's option string `args`
    /// (e.g. `-f rtf -t commonmark_x`).
    async fn convert(&self, args: &str, input: &str) -> Result<EngineOutput, EngineError>;
}

/// One-time initialization guard.
///
/// The first successful initializer's value is kept for the life of the
/// guard. A failed attempt leaves the guard empty, so the next caller tries
/// again.
#[derive(Debug)]
pub struct InitGuard<T> {
    cell: OnceCell<T>,
}

impl<T> InitGuard<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<&T, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        self.cell.get_or_try_init(init).await
    }
}

impl<T> Default for InitGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the engine selected in configuration. Nothing is loaded or spawned
/// until the first conversion.
pub fn from_config(config: &EngineConfig) -> Arc<dyn ConversionEngine> {
    match config.kind {
        EngineKind::Process => Arc::new(ProcessEngine::new(&config.program)),
        EngineKind::Wasm => Arc::new(WasmEngine::new(&config.module)),
    }
}
