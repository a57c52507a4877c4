// Normalization to the document invariants.
//
// Every tree that leaves the converter or an editing operation passes through
// here, so equality between documents is structural equality of normal forms:
//   - the root holds only paragraphs and bulleted lists
//   - lists hold only list items, items and paragraphs hold only inline content
//   - links hold only text
//   - adjacent texts with equal marks are merged, empty texts dropped unless
//     they are the only child, adjacent links to the same url merged

use std::mem;

use super::node::{Element, ElementKind, Node, Text};

/// Normalizes a sequence of loose nodes into top-level blocks.
/// The result may be empty; callers build the canonical empty document from that.
pub(crate) fn normalize_root(nodes: Vec<Node>) -> Vec<Element> {
    let mut blocks = Vec::new();
    let mut inline: Vec<Node> = Vec::new();
    let mut items: Vec<Node> = Vec::new();

    for node in nodes {
        match node {
            Node::Element(element) => match element.kind {
                ElementKind::Paragraph => {
                    flush_inline(&mut inline, &mut blocks);
                    flush_items(&mut items, &mut blocks);
                    blocks.push(Element::paragraph(normalize_inline(element.children)));
                }
                ElementKind::BulletedList => {
                    flush_inline(&mut inline, &mut blocks);
                    flush_items(&mut items, &mut blocks);
                    let list = normalize_list(element.children);
                    if !list.is_empty() {
                        blocks.push(Element::bulleted_list(list));
                    }
                }
                ElementKind::ListItem => {
                    flush_inline(&mut inline, &mut blocks);
                    items.push(Node::Element(element));
                }
                ElementKind::Link { .. } => {
                    flush_items(&mut items, &mut blocks);
                    inline.push(Node::Element(element));
                }
            },
            Node::Text(text) => {
                if !items.is_empty() && is_blank_text(&text) {
                    continue;
                }
                flush_items(&mut items, &mut blocks);
                inline.push(Node::Text(text));
            }
        }
    }

    flush_inline(&mut inline, &mut blocks);
    flush_items(&mut items, &mut blocks);
    blocks
}

/// Normalizes the children of a bulleted list into list items.
/// Nested lists are flattened into the parent; paragraphs become items.
pub(crate) fn normalize_list(children: Vec<Node>) -> Vec<Element> {
    let mut items = Vec::new();
    let mut loose: Vec<Node> = Vec::new();

    for child in children {
        match child {
            Node::Element(element) => match element.kind {
                ElementKind::ListItem | ElementKind::Paragraph => {
                    flush_loose_items(&mut loose, &mut items);
                    items.push(Element::list_item(normalize_inline(element.children)));
                }
                ElementKind::BulletedList => {
                    flush_loose_items(&mut loose, &mut items);
                    items.extend(normalize_list(element.children));
                }
                ElementKind::Link { .. } => loose.push(Node::Element(element)),
            },
            text @ Node::Text(_) => loose.push(text),
        }
    }

    flush_loose_items(&mut loose, &mut items);
    items
}

/// Normalizes the content of a text block (paragraph or list item).
/// Block elements found here are flattened into their inline content.
pub(crate) fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut flat = Vec::new();
    flatten_inline(nodes, &mut flat);
    merge_inline(flat)
}

fn flatten_inline(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Node::Text(text)),
            Node::Element(element) => match element.kind {
                ElementKind::Link { url } => {
                    let mut texts = Vec::new();
                    collect_texts(element.children, &mut texts);
                    out.push(Node::Element(Element::link(
                        url,
                        merge_inline(texts.into_iter().map(Node::Text).collect()),
                    )));
                }
                _ => flatten_inline(element.children, out),
            },
        }
    }
}

fn collect_texts(nodes: Vec<Node>, out: &mut Vec<Text>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(text),
            Node::Element(element) => collect_texts(element.children, out),
        }
    }
}

/// Merges neighbours and guarantees a non-empty result.
fn merge_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut first_empty: Option<Text> = None;

    for node in nodes {
        match node {
            Node::Text(text) if text.is_empty() => {
                first_empty.get_or_insert(text);
            }
            Node::Text(text) => match out.last_mut() {
                Some(Node::Text(prev)) if prev.marks == text.marks => prev.text.push_str(&text.text),
                _ => out.push(Node::Text(text)),
            },
            Node::Element(element) => {
                if let Some(Node::Element(prev)) = out.last_mut() {
                    if prev.kind.is_inline() && prev.kind == element.kind {
                        let mut children = mem::take(&mut prev.children);
                        children.extend(element.children);
                        prev.children = merge_inline(children);
                        continue;
                    }
                }
                out.push(Node::Element(element));
            }
        }
    }

    if out.is_empty() {
        out.push(Node::Text(first_empty.unwrap_or_default()));
    }
    out
}

fn flush_inline(inline: &mut Vec<Node>, blocks: &mut Vec<Element>) {
    if inline.is_empty() {
        return;
    }
    let nodes = mem::take(inline);
    if nodes.iter().all(is_blank) {
        return;
    }
    blocks.push(Element::paragraph(normalize_inline(nodes)));
}

fn flush_items(items: &mut Vec<Node>, blocks: &mut Vec<Element>) {
    if items.is_empty() {
        return;
    }
    let list = normalize_list(mem::take(items));
    if !list.is_empty() {
        blocks.push(Element::bulleted_list(list));
    }
}

fn flush_loose_items(loose: &mut Vec<Node>, items: &mut Vec<Element>) {
    if loose.is_empty() {
        return;
    }
    let nodes = mem::take(loose);
    if nodes.iter().all(is_blank) {
        return;
    }
    items.push(Element::list_item(normalize_inline(nodes)));
}

fn is_blank(node: &Node) -> bool {
    matches!(node, Node::Text(text) if is_blank_text(text))
}

fn is_blank_text(text: &Text) -> bool {
    text.text.trim().is_empty()
}
