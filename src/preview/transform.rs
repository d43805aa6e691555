//! Tree rewrites applied between parsing and rendering.
//!
//! Stages run in the order of [`STAGES`]; each one decides from the caller's
//! [`PreviewOptions`] whether it applies to this render.

use tracing::trace;

use super::PreviewOptions;
use super::tree::{Node, NodeKind};

/// A single optional rewrite of the syntax tree.
pub struct Stage {
    pub name: &'static str,
    enabled: fn(&PreviewOptions) -> bool,
    apply: fn(&mut Node<'_>),
}

impl Stage {
    pub fn is_enabled(&self, options: &PreviewOptions) -> bool {
        (self.enabled)(options)
    }
}

pub static STAGES: &[Stage] = &[Stage {
    name: "strip-gfm-extras",
    enabled: extras_disabled,
    apply: strip_gfm_extras,
}];

fn extras_disabled(options: &PreviewOptions) -> bool {
    !options.enable_gfm_extras
}

/// Run every enabled stage over `root`, in order.
pub fn run(root: &mut Node<'_>, options: &PreviewOptions) {
    for stage in STAGES.iter().filter(|stage| stage.is_enabled(options)) {
        trace!(stage = stage.name, "applying tree transform");
        (stage.apply)(root);
    }
}

/// Remove GitHub extensions the preview was not asked to show.
///
/// Strikethrough and autolink-literal nodes are replaced in place by their
/// children, so their text survives in the same position. Task-list state is
/// cleared from list items, leaving plain items behind.
pub fn strip_gfm_extras(node: &mut Node<'_>) {
    if let NodeKind::ListItem { checked } = &mut node.kind {
        *checked = None;
    }

    if node.children.iter().any(is_extra) {
        let children = std::mem::take(&mut node.children);
        for child in children {
            unwrap_into(child, &mut node.children);
        }
    }

    for child in &mut node.children {
        strip_gfm_extras(child);
    }
}

fn is_extra(node: &Node<'_>) -> bool {
    matches!(
        node.kind,
        NodeKind::Delete | NodeKind::AutolinkLiteral { .. }
    )
}

fn unwrap_into<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if is_extra(&node) {
        for child in node.children {
            unwrap_into(child, out);
        }
    } else {
        out.push(node);
    }
}
