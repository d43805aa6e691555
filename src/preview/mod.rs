//! Sanitized Markdown preview.
//!
//! Markdown is parsed into a [`tree::Node`] tree, rewritten by the enabled
//! [`transform`] stages, written as HTML without any raw HTML from the
//! source, and then cleaned against a [`schema::Schema`] allow-list. The
//! result is safe to inject into a page as-is.

pub mod heuristic;
pub mod html;
pub mod schema;
pub mod transform;
pub mod tree;

use serde::{Deserialize, Serialize};
use tracing::debug;

use schema::{Schema, SchemaLayer};

/// Per-render switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOptions {
    /// Show task lists, strikethrough and bare-URL links. When off they are
    /// stripped from the tree before rendering.
    #[serde(default)]
    pub enable_gfm_extras: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendered {
    pub html: String,
    /// Advisory count of unsafe-looking patterns in the input. See
    /// [`heuristic::estimate_unsafe`].
    pub removed_unsafe: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("tag '{0}' cannot be allowed in previews")]
    ForbiddenTag(String),
    #[error("attribute '{attribute}' on '{tag}' cannot be allowed in previews")]
    ForbiddenAttribute { tag: String, attribute: String },
    #[error("allow-list entries must not be empty")]
    EmptyName,
}

/// Renders Markdown to sanitized HTML under a fixed schema.
#[derive(Debug, Clone, Default)]
pub struct Previewer {
    schema: Schema,
}

impl Previewer {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// The default table-aware schema extended by an operator layer.
    pub fn with_layer(layer: &SchemaLayer) -> Result<Self, PreviewError> {
        Ok(Self::new(Schema::default().merge(layer)?))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn render(&self, markdown: &str, options: PreviewOptions) -> Rendered {
        let removed_unsafe = heuristic::estimate_unsafe(markdown);

        let mut tree = tree::parse(markdown);
        transform::run(&mut tree, &options);
        let raw = html::to_html(&tree);
        let html = self.schema.cleaner().clean(&raw).to_string();

        debug!(
            bytes_in = markdown.len(),
            bytes_out = html.len(),
            removed_unsafe,
            gfm_extras = options.enable_gfm_extras,
            "rendered preview"
        );
        Rendered {
            html,
            removed_unsafe,
        }
    }
}

/// Render with the default schema.
pub fn render(markdown: &str, options: PreviewOptions) -> Rendered {
    Previewer::default().render(markdown, options)
}
