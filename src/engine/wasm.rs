use async_trait::async_trait;
use extism::{Manifest, Plugin, Wasm};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::{ConversionEngine, EngineError, EngineOutput, InitGuard};

/// Name of the export every conversion module provides.
pub const CONVERT_EXPORT: &str = "convert";

/// Wall-clock limit for a single call into the module.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ConvertRequest<'a> {
    args: &'a str,
    input: &'a str,
}

/// Hosts a WebAssembly conversion module in an `extism` sandbox.
///
/// The module gets no host functions and no filesystem or network access.
/// Its `convert` export takes `{"args": .., "input": ..}` as JSON and returns
/// `{"out": .., "log": ..}`. The module is loaded and validated once; every
/// conversion then runs in a fresh instance so no state carries over.
pub struct WasmEngine {
    path: PathBuf,
    manifest: InitGuard<Manifest>,
}

impl WasmEngine {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            manifest: InitGuard::new(),
        }
    }

    async fn load(&self) -> Result<Manifest, EngineError> {
        if !self.path.exists() {
            return Err(EngineError::Init(format!(
                "conversion module not found: {}",
                self.path.display()
            )));
        }

        let manifest = Manifest::new([Wasm::file(&self.path)]).with_timeout(CALL_TIMEOUT);

        // Validate by instantiating once.
        let probe = manifest.clone();
        tokio::task::spawn_blocking(move || Plugin::new(probe, [], true).map(drop))
            .await
            .map_err(|e| EngineError::Init(e.to_string()))?
            .map_err(|e| EngineError::Init(e.to_string()))?;

        info!(module = %self.path.display(), "conversion module loaded");
        Ok(manifest)
    }
}

#[async_trait]
impl ConversionEngine for WasmEngine {
    fn name(&self) -> &str {
        "wasm"
    }

    async fn init(&self) -> Result<(), EngineError> {
        self.manifest.get_or_init(|| self.load()).await?;
        Ok(())
    }

    async fn convert(&self, args: &str, input: &str) -> Result<EngineOutput, EngineError> {
        let manifest = self.manifest.get_or_init(|| self.load()).await?.clone();
        let request = serde_json::to_vec(&ConvertRequest { args, input })
            .map_err(|e| EngineError::Call(e.to_string()))?;

        let response = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, EngineError> {
            let mut plugin = Plugin::new(manifest, [], true)
                .map_err(|e| EngineError::Call(e.to_string()))?;
            plugin
                .call::<&[u8], Vec<u8>>(CONVERT_EXPORT, request.as_slice())
                .map_err(|e| EngineError::Call(e.to_string()))
        })
        .await
        .map_err(|e| EngineError::Call(e.to_string()))??;

        decode_output(&response)
    }
}

/// Parse a module's JSON response. A missing `log` is treated as empty.
pub fn decode_output(bytes: &[u8]) -> Result<EngineOutput, EngineError> {
    serde_json::from_slice(bytes).map_err(|e| EngineError::Decode(e.to_string()))
}
