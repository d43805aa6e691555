use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use crate::convert::DEFAULT_ARGS;
use crate::preview::schema::SchemaLayer;
use crate::preview::{PreviewError, PreviewOptions, Previewer};

/// Largest accepted upload: 2.5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2_621_440;

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RtfmarkConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Origins allowed to call the API cross-origin. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_port() -> u16 {
    7300
}
fn default_bind() -> String {
    "127.0.0.1".into()
}
fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Process,
    Wasm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub kind: EngineKind,
    /// Converter program for the `process` engine.
    #[serde(default = "default_program")]
    pub program: String,
    /// Conversion module for the `wasm` engine.
    #[serde(default = "default_module")]
    pub module: String,
    #[serde(default = "default_args")]
    pub args: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            program: default_program(),
            module: default_module(),
            args: default_args(),
        }
    }
}

fn default_program() -> String {
    "pandoc".into()
}
fn default_module() -> String {
    "public/pandoc.wasm".into()
}
fn default_args() -> String {
    DEFAULT_ARGS.into()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Default for requests that do not say.
    pub enable_gfm_extras: bool,
    /// Extra tags and attributes on top of the built-in allow-list.
    pub allow: SchemaLayer,
}

impl PreviewConfig {
    /// Options for one render; an explicit choice wins over the default.
    pub fn options(&self, enable_gfm_extras: Option<bool>) -> PreviewOptions {
        PreviewOptions {
            enable_gfm_extras: enable_gfm_extras.unwrap_or(self.enable_gfm_extras),
        }
    }

    pub fn previewer(&self) -> Result<Previewer, PreviewError> {
        Previewer::with_layer(&self.allow)
    }
}

/// Load configuration from file or use defaults.
///
/// Search order:
/// 1. `RTFMARK_CONFIG` env var
/// 2. `~/.rtfmark/config.toml`
/// 3. Zero-config defaults (no file needed)
pub fn load() -> anyhow::Result<RtfmarkConfig> {
    let path = config_path();

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let config = parse(&content)
            .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))?;

        info!("loaded config from {}", path.display());
        Ok(config)
    } else {
        info!("no config file found, using zero-config defaults");
        Ok(RtfmarkConfig::default())
    }
}

/// Parse and validate a TOML document.
pub fn parse(content: &str) -> anyhow::Result<RtfmarkConfig> {
    let config: RtfmarkConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("RTFMARK_CONFIG") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".rtfmark").join("config.toml")
}

/// Validate the config and return clear error messages.
fn validate(config: &RtfmarkConfig) -> anyhow::Result<()> {
    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be > 0");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.engine.args.split_whitespace().next().is_none() {
        anyhow::bail!("engine.args must not be empty");
    }

    match config.engine.kind {
        EngineKind::Process if config.engine.program.trim().is_empty() => {
            anyhow::bail!("engine.program must be set for the process engine");
        }
        EngineKind::Wasm if config.engine.module.trim().is_empty() => {
            anyhow::bail!("engine.module must be set for the wasm engine");
        }
        _ => {}
    }

    config
        .preview
        .allow
        .validate()
        .map_err(|e| anyhow::anyhow!("preview.allow: {e}"))?;

    Ok(())
}
