//! Markdown tree to unsanitized HTML.
//!
//! The tree is replayed as `pulldown-cmark` events and written with its HTML
//! writer. Raw HTML from the source is never replayed. Tables are written
//! here rather than by the writer so column alignment lands in `align`
//! attributes the sanitizer schema knows about.

use pulldown_cmark::{Alignment, CowStr, Event, LinkType, Tag, TagEnd, html};

use super::tree::{Node, NodeKind};

pub fn to_html(root: &Node<'_>) -> String {
    let mut events = Vec::new();
    emit(root, &mut events);

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

fn emit<'a>(node: &Node<'a>, out: &mut Vec<Event<'a>>) {
    match &node.kind {
        NodeKind::Root => emit_children(node, out),
        NodeKind::Leaf(Event::Html(_) | Event::InlineHtml(_)) => {}
        NodeKind::Leaf(event) => out.push(event.clone()),
        NodeKind::Container(Tag::HtmlBlock) => {}
        NodeKind::Container(Tag::Table(alignments)) => emit_table(node, alignments, out),
        NodeKind::Container(tag) => wrap(tag.clone(), node, out),
        NodeKind::ListItem { checked } => emit_item(node, *checked, out),
        NodeKind::Delete => wrap(Tag::Strikethrough, node, out),
        NodeKind::AutolinkLiteral { url } => {
            let link = Tag::Link {
                link_type: LinkType::Inline,
                dest_url: url.clone(),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            };
            wrap(link, node, out);
        }
    }
}

fn emit_children<'a>(node: &Node<'a>, out: &mut Vec<Event<'a>>) {
    for child in &node.children {
        emit(child, out);
    }
}

fn wrap<'a>(tag: Tag<'a>, node: &Node<'a>, out: &mut Vec<Event<'a>>) {
    let end = tag.to_end();
    out.push(Event::Start(tag));
    emit_children(node, out);
    out.push(Event::End(end));
}

// Loose items wrap their text in a paragraph; the checkbox belongs inside it.
fn emit_item<'a>(node: &Node<'a>, checked: Option<bool>, out: &mut Vec<Event<'a>>) {
    out.push(Event::Start(Tag::Item));

    let mut children = node.children.iter().peekable();
    if let Some(checked) = checked {
        match children.peek() {
            Some(first) if matches!(first.kind, NodeKind::Container(Tag::Paragraph)) => {
                out.push(Event::Start(Tag::Paragraph));
                out.push(Event::TaskListMarker(checked));
                emit_children(first, out);
                out.push(Event::End(TagEnd::Paragraph));
                children.next();
            }
            _ => out.push(Event::TaskListMarker(checked)),
        }
    }
    for child in children {
        emit(child, out);
    }

    out.push(Event::End(TagEnd::Item));
}

fn emit_table<'a>(node: &Node<'a>, alignments: &[Alignment], out: &mut Vec<Event<'a>>) {
    out.push(Event::Html("<table>\n".into()));

    let mut body_open = false;
    for section in &node.children {
        match section.kind {
            NodeKind::Container(Tag::TableHead) => {
                out.push(Event::Html("<thead>\n<tr>".into()));
                emit_cells(section, "th", alignments, out);
                out.push(Event::Html("</tr>\n</thead>\n".into()));
            }
            NodeKind::Container(Tag::TableRow) => {
                if !body_open {
                    out.push(Event::Html("<tbody>\n".into()));
                    body_open = true;
                }
                out.push(Event::Html("<tr>".into()));
                emit_cells(section, "td", alignments, out);
                out.push(Event::Html("</tr>\n".into()));
            }
            _ => emit(section, out),
        }
    }

    if body_open {
        out.push(Event::Html("</tbody>\n".into()));
    }
    out.push(Event::Html("</table>\n".into()));
}

fn emit_cells<'a>(row: &Node<'a>, cell: &str, alignments: &[Alignment], out: &mut Vec<Event<'a>>) {
    let mut column = 0;
    for child in &row.children {
        if !matches!(child.kind, NodeKind::Container(Tag::TableCell)) {
            emit(child, out);
            continue;
        }

        let open = match alignments.get(column) {
            Some(Alignment::Left) => format!(r#"<{cell} align="left">"#),
            Some(Alignment::Center) => format!(r#"<{cell} align="center">"#),
            Some(Alignment::Right) => format!(r#"<{cell} align="right">"#),
            Some(Alignment::None) | None => format!("<{cell}>"),
        };
        out.push(Event::Html(open.into()));
        emit_children(child, out);
        out.push(Event::Html(format!("</{cell}>").into()));
        column += 1;
    }
}
