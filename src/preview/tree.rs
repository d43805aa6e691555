//! Markdown syntax tree.
//!
//! `pulldown-cmark` hands out a flat event stream; the preview pipeline needs
//! a tree it can rewrite before rendering, so the events are folded into
//! [`Node`]s here. Task-list markers become an attribute of their list item,
//! strikethrough gets its own node kind, and bare URLs are recognised as
//! autolink literals the way GitHub does.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use regex::Regex;
use std::sync::LazyLock;

/// Containers nested deeper than this are flattened into their ancestor.
pub const MAX_NESTING: usize = 128;

static AUTOLINK_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<]*").expect("autolink literal regex is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<'a> {
    Root,
    /// Any block or inline container without special handling.
    Container(Tag<'a>),
    /// A list item; `checked` is set for task-list items.
    ListItem { checked: Option<bool> },
    /// Strikethrough span.
    Delete,
    /// Bare URL recognised in text. Children hold the visible text.
    AutolinkLiteral { url: CowStr<'a> },
    /// Text, inline code, raw HTML, breaks and rules.
    Leaf(Event<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    pub fn new(kind: NodeKind<'a>) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn leaf(event: Event<'a>) -> Self {
        Self::new(NodeKind::Leaf(event))
    }

    /// Concatenated text and inline code of the whole subtree.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeKind::Leaf(Event::Text(text) | Event::Code(text)) = &self.kind {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Number of nodes in the subtree (self included) matching `predicate`.
    pub fn count(&self, predicate: &impl Fn(&NodeKind<'a>) -> bool) -> usize {
        let own = usize::from(predicate(&self.kind));
        own + self
            .children
            .iter()
            .map(|child| child.count(predicate))
            .sum::<usize>()
    }
}

/// Grammar extensions layered on CommonMark.
pub fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Parse Markdown into a tree. Never fails: unrecognised input degrades to
/// paragraphs and text.
pub fn parse(markdown: &str) -> Node<'_> {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options()) {
        builder.push(event);
    }
    let mut root = builder.finish();
    link_literals(&mut root, false);
    root
}

struct TreeBuilder<'a> {
    stack: Vec<Node<'a>>,
    /// Open containers swallowed by the nesting cap.
    overflow: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new() -> Self {
        Self {
            stack: vec![Node::new(NodeKind::Root)],
            overflow: 0,
        }
    }

    fn push(&mut self, event: Event<'a>) {
        match event {
            Event::Start(tag) => {
                if self.stack.len() > MAX_NESTING {
                    self.overflow += 1;
                    return;
                }
                let kind = match tag {
                    Tag::Item => NodeKind::ListItem { checked: None },
                    Tag::Strikethrough => NodeKind::Delete,
                    other => NodeKind::Container(other),
                };
                self.stack.push(Node::new(kind));
            }
            Event::End(_) => {
                if self.overflow > 0 {
                    self.overflow -= 1;
                } else {
                    self.close();
                }
            }
            Event::TaskListMarker(checked) => {
                let item = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|node| matches!(node.kind, NodeKind::ListItem { .. }));
                if let Some(item) = item {
                    item.kind = NodeKind::ListItem {
                        checked: Some(checked),
                    };
                }
            }
            Event::Text(text) => self.append_text(text),
            other => self.append(Node::leaf(other)),
        }
    }

    fn close(&mut self) {
        if self.stack.len() > 1 {
            if let Some(node) = self.stack.pop() {
                self.append(node);
            }
        }
    }

    fn append(&mut self, node: Node<'a>) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    // pulldown-cmark splits text at delimiter candidates; merge the pieces so
    // URLs and other runs stay in one leaf.
    fn append_text(&mut self, text: CowStr<'a>) {
        if let Some(parent) = self.stack.last_mut() {
            if let Some(Node {
                kind: NodeKind::Leaf(Event::Text(previous)),
                ..
            }) = parent.children.last_mut()
            {
                let merged = [&**previous, &*text].concat();
                *previous = CowStr::from(merged);
                return;
            }
        }
        self.append(Node::leaf(Event::Text(text)));
    }

    fn finish(mut self) -> Node<'a> {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .unwrap_or_else(|| Node::new(NodeKind::Root))
    }
}

fn link_literals(node: &mut Node<'_>, inside_link: bool) {
    let skip = inside_link
        || matches!(
            node.kind,
            NodeKind::AutolinkLiteral { .. }
                | NodeKind::Container(
                    Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_) | Tag::HtmlBlock
                )
        );

    if !skip && node.children.iter().any(has_literal) {
        let children = std::mem::take(&mut node.children);
        for child in children {
            match child {
                Node {
                    kind: NodeKind::Leaf(Event::Text(text)),
                    ..
                } => node.children.extend(split_literals(&text)),
                other => node.children.push(other),
            }
        }
    }

    for child in &mut node.children {
        link_literals(child, skip);
    }
}

fn has_literal(node: &Node<'_>) -> bool {
    match &node.kind {
        NodeKind::Leaf(Event::Text(text)) => AUTOLINK_LITERAL
            .find_iter(text)
            .any(|m| literal_candidate(m.as_str()).is_some()),
        _ => false,
    }
}

fn split_literals<'a>(text: &str) -> Vec<Node<'a>> {
    let mut nodes = Vec::new();
    let mut last = 0;

    for found in AUTOLINK_LITERAL.find_iter(text) {
        let Some(candidate) = literal_candidate(found.as_str()) else {
            continue;
        };
        let start = found.start();
        if start > last {
            nodes.push(text_node(&text[last..start]));
        }

        let url = if candidate.len() >= 4 && candidate[..4].eq_ignore_ascii_case("www.") {
            format!("http://{candidate}")
        } else {
            candidate.to_string()
        };
        nodes.push(Node {
            kind: NodeKind::AutolinkLiteral { url: url.into() },
            children: vec![text_node(candidate)],
        });
        last = start + candidate.len();
    }

    if last < text.len() {
        nodes.push(text_node(&text[last..]));
    }
    nodes
}

fn text_node<'a>(text: &str) -> Node<'a> {
    Node::leaf(Event::Text(CowStr::from(text.to_string())))
}

/// Trim trailing punctuation off a regex match and reject matches with
/// nothing linkable after the prefix.
fn literal_candidate(found: &str) -> Option<&str> {
    let trimmed = trim_trailing(found);
    let prefix_len = if trimmed.len() >= 4 && trimmed[..4].eq_ignore_ascii_case("www.") {
        4
    } else {
        trimmed.find("://").map(|i| i + 3)?
    };
    let rest = trimmed.get(prefix_len..)?;
    rest.chars()
        .next()
        .filter(|c| c.is_alphanumeric())
        .map(|_| trimmed)
}

fn trim_trailing(mut s: &str) -> &str {
    loop {
        let Some(last) = s.chars().last() else {
            return s;
        };
        let unbalanced_paren =
            last == ')' && s.matches(')').count() > s.matches('(').count();
        if matches!(
            last,
            '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"'
        ) || unbalanced_paren
        {
            s = &s[..s.len() - 1];
        } else {
            return s;
        }
    }
}
