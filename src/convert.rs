//! RTF to Markdown conversion with fidelity checks.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Instant;
use tracing::{debug, warn};

use crate::engine::{ConversionEngine, EngineError};

/// Read RTF, write CommonMark with pipe tables, never hard-wrap.
pub const DEFAULT_ARGS: &str = "-f rtf -t commonmark_x+pipe_tables --wrap=none";

pub const TABLE_FIDELITY_WARNING: &str = "This table contains merged cells or complex content; \
     Markdown tables may be lossy. Preview uses sanitized HTML.";

static HTML_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<table[\s>]").expect("table regex is valid"));
static MERGED_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)colspan=|rowspan=").expect("merged cell regex is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMeta {
    /// Engine wall time in milliseconds.
    pub ms: f64,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub markdown: String,
    pub warnings: Vec<String>,
    /// The engine's diagnostics, trimmed. Empty when it had nothing to say.
    pub stderr: String,
    pub meta: ConversionMeta,
}

/// Convert an RTF document to Markdown.
///
/// The engine is initialized on first use. Output is trimmed of surrounding
/// whitespace; byte counts are UTF-8 lengths of the input and the trimmed
/// output.
pub async fn convert_rtf(
    engine: &dyn ConversionEngine,
    args: &str,
    rtf: &str,
) -> Result<Conversion, EngineError> {
    engine.init().await?;

    let start = Instant::now();
    let output = engine.convert(args, rtf).await?;
    let ms = start.elapsed().as_secs_f64() * 1000.0;

    let markdown = output.out.trim().to_string();
    let warnings = fidelity_warnings(&markdown);
    if !warnings.is_empty() {
        warn!(engine = engine.name(), "converted document contains HTML tables");
    }

    let meta = ConversionMeta {
        ms,
        bytes_in: rtf.len(),
        bytes_out: markdown.len(),
    };
    debug!(
        engine = engine.name(),
        ms = meta.ms,
        bytes_in = meta.bytes_in,
        bytes_out = meta.bytes_out,
        "converted document"
    );

    Ok(Conversion {
        markdown,
        warnings,
        stderr: output.log.trim().to_string(),
        meta,
    })
}

/// Warnings about content that Markdown cannot carry faithfully.
///
/// Tables with merged cells cannot be written as pipe tables, so the engine
/// falls back to raw HTML tables. At most one warning is produced.
pub fn fidelity_warnings(markdown: &str) -> Vec<String> {
    if HTML_TABLE.is_match(markdown) || MERGED_CELL.is_match(markdown) {
        vec![TABLE_FIDELITY_WARNING.to_string()]
    } else {
        Vec::new()
    }
}
