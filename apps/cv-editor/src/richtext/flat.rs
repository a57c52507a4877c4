// Flat view of a document used by the editing operations.
//
// Each paragraph or list item becomes one `TextBlock` tagged with the list
// it belongs to. Operations edit the flat blocks and their inline content,
// then `into_document` regroups consecutive items of the same list and
// normalizes, so every operation rebuilds the tree instead of patching it.

use std::mem;

use super::node::{Document, Element, ElementKind, Marks, Node, Text};
use super::normalize::normalize_inline;
use super::selection::{Point, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextBlock {
    /// Identity of the enclosing bulleted list, `None` for a paragraph.
    pub list: Option<usize>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub(crate) struct FlatDocument {
    pub blocks: Vec<TextBlock>,
    next_list: usize,
}

impl FlatDocument {
    pub fn from_document(document: &Document) -> Self {
        let mut blocks = Vec::new();
        for (index, element) in document.blocks().iter().enumerate() {
            match element.kind {
                ElementKind::BulletedList => {
                    for item in element.children.iter().filter_map(Node::as_element) {
                        blocks.push(TextBlock {
                            list: Some(index),
                            children: item.children.clone(),
                        });
                    }
                }
                _ => blocks.push(TextBlock {
                    list: None,
                    children: element.children.clone(),
                }),
            }
        }
        Self {
            blocks,
            next_list: document.blocks().len(),
        }
    }

    /// A list identity distinct from every list already in the document.
    pub fn fresh_list(&mut self) -> usize {
        let id = self.next_list;
        self.next_list += 1;
        id
    }

    pub fn block_len(&self, index: usize) -> usize {
        self.blocks
            .get(index)
            .map(|block| inline_len(&block.children))
            .unwrap_or(0)
    }

    pub fn into_document(self) -> Document {
        let mut out: Vec<Element> = Vec::new();
        let mut open_list: Option<(usize, Vec<Element>)> = None;

        for block in self.blocks {
            let children = normalize_inline(block.children);
            match block.list {
                None => {
                    close_list(&mut open_list, &mut out);
                    out.push(Element::paragraph(children));
                }
                Some(id) => {
                    let item = Element::list_item(children);
                    if let Some((open_id, items)) = open_list.as_mut() {
                        if *open_id == id {
                            items.push(item);
                            continue;
                        }
                    }
                    close_list(&mut open_list, &mut out);
                    open_list = Some((id, vec![item]));
                }
            }
        }
        close_list(&mut open_list, &mut out);

        Document::from_blocks(out)
    }
}

fn close_list(open_list: &mut Option<(usize, Vec<Element>)>, out: &mut Vec<Element>) {
    if let Some((_, items)) = open_list.take() {
        out.push(Element::bulleted_list(items));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Point ↔ position resolution
// ────────────────────────────────────────────────────────────────────────────

/// Every text block with the path prefix that addresses it.
fn text_blocks(document: &Document) -> Vec<(Vec<usize>, &[Node])> {
    let mut out = Vec::new();
    for (index, element) in document.blocks().iter().enumerate() {
        match element.kind {
            ElementKind::BulletedList => {
                for (item_index, item) in element.children.iter().enumerate() {
                    if let Some(item) = item.as_element() {
                        out.push((vec![index, item_index], item.children.as_slice()));
                    }
                }
            }
            _ => out.push((vec![index], element.children.as_slice())),
        }
    }
    out
}

/// Resolves a point into a position. `None` when the path does not end at a
/// text leaf or the offset is past the end of that leaf.
pub(crate) fn position_of(document: &Document, point: &Point) -> Option<Position> {
    let (&top, rest) = point.path.split_first()?;
    let element = document.blocks().get(top)?;

    let mut ordinal: usize = document.blocks()[..top]
        .iter()
        .map(|block| match block.kind {
            ElementKind::BulletedList => block.children.len(),
            _ => 1,
        })
        .sum();

    let (children, inner) = match element.kind {
        ElementKind::BulletedList => {
            let (&item_index, inner) = rest.split_first()?;
            let item = element.children.get(item_index)?.as_element()?;
            ordinal += item_index;
            (item.children.as_slice(), inner)
        }
        _ => (element.children.as_slice(), rest),
    };

    let offset = inline_offset(children, inner, point.offset)?;
    Some(Position::new(ordinal, offset))
}

fn inline_offset(nodes: &[Node], path: &[usize], offset: usize) -> Option<usize> {
    let (&index, rest) = path.split_first()?;
    let node = nodes.get(index)?;
    let before = inline_len(&nodes[..index]);
    match node {
        Node::Text(text) if rest.is_empty() && offset <= text.len() => Some(before + offset),
        Node::Element(element) if element.kind.is_inline() => {
            Some(before + inline_offset(&element.children, rest, offset)?)
        }
        _ => None,
    }
}

/// The point for a position, clamped to the document's extent.
pub(crate) fn point_at(document: &Document, position: Position) -> Option<Point> {
    let blocks = text_blocks(document);
    let last = blocks.len().checked_sub(1)?;
    let (prefix, children) = &blocks[position.block.min(last)];
    let offset = position.offset.min(inline_len(children));
    let (inner, leaf_offset) = leaf_at(children, offset)?;
    let mut path = prefix.clone();
    path.extend(inner);
    Some(Point::new(path, leaf_offset))
}

/// The leaf holding `offset`. At a boundary between two leaves the earlier
/// one wins, so a cursor carries the formatting of the text before it.
fn leaf_at(nodes: &[Node], offset: usize) -> Option<(Vec<usize>, usize)> {
    let mut start = 0;
    for (index, node) in nodes.iter().enumerate() {
        let len = node_len(node);
        if offset <= start + len {
            return match node {
                Node::Text(_) => Some((vec![index], offset - start)),
                Node::Element(element) => {
                    let (mut path, leaf_offset) = leaf_at(&element.children, offset - start)?;
                    path.insert(0, index);
                    Some((path, leaf_offset))
                }
            };
        }
        start += len;
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Inline content helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn inline_len(nodes: &[Node]) -> usize {
    nodes.iter().map(node_len).sum()
}

fn node_len(node: &Node) -> usize {
    match node {
        Node::Text(text) => text.len(),
        Node::Element(element) => inline_len(&element.children),
    }
}

/// Splits inline content at a character offset. A link straddling the
/// offset is split into two links with the same url.
pub(crate) fn split_inline(nodes: Vec<Node>, at: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut start = 0;

    for node in nodes {
        let len = node_len(&node);
        if start + len <= at {
            left.push(node);
        } else if start >= at {
            right.push(node);
        } else {
            let cut = at - start;
            match node {
                Node::Text(text) => {
                    let (a, b) = split_text(text, cut);
                    left.push(Node::Text(a));
                    right.push(Node::Text(b));
                }
                Node::Element(element) => {
                    let (a, b) = split_inline(element.children, cut);
                    left.push(Node::Element(Element {
                        kind: element.kind.clone(),
                        children: a,
                    }));
                    right.push(Node::Element(Element {
                        kind: element.kind,
                        children: b,
                    }));
                }
            }
        }
        start += len;
    }

    (left, right)
}

fn split_text(text: Text, at: usize) -> (Text, Text) {
    let byte = text
        .text
        .char_indices()
        .nth(at)
        .map(|(i, _)| i)
        .unwrap_or(text.text.len());
    let tail = text.text[byte..].to_string();
    let mut head = text.text;
    head.truncate(byte);
    (
        Text::marked(head, text.marks),
        Text::marked(tail, text.marks),
    )
}

/// Splits inline content into the parts before, inside and after `[start, end)`.
pub(crate) fn slice_inline(nodes: Vec<Node>, start: usize, end: usize) -> (Vec<Node>, Vec<Node>, Vec<Node>) {
    let (left, rest) = split_inline(nodes, start);
    let (middle, right) = split_inline(rest, end.saturating_sub(start));
    (left, middle, right)
}

pub(crate) fn concat(parts: [Vec<Node>; 3]) -> Vec<Node> {
    let [mut left, middle, right] = parts;
    left.extend(middle);
    left.extend(right);
    left
}

pub(crate) fn for_each_text(nodes: &mut [Node], f: &mut dyn FnMut(&mut Text)) {
    for node in nodes {
        match node {
            Node::Text(text) => f(text),
            Node::Element(element) => for_each_text(&mut element.children, f),
        }
    }
}

/// Marks of every non-empty text overlapping `[start, end)`.
pub(crate) fn marks_in_range(nodes: &[Node], start: usize, end: usize) -> Vec<Marks> {
    let mut out = Vec::new();
    collect_marks(nodes, start, end, 0, &mut out);
    out
}

fn collect_marks(nodes: &[Node], start: usize, end: usize, base: usize, out: &mut Vec<Marks>) {
    let mut offset = base;
    for node in nodes {
        let len = node_len(node);
        if offset < end && start < offset + len {
            match node {
                Node::Text(text) => out.push(text.marks),
                Node::Element(element) => collect_marks(&element.children, start, end, offset, out),
            }
        }
        offset += len;
    }
}

/// Marks of the leaf a collapsed cursor at `offset` sits in.
pub(crate) fn marks_at(nodes: &[Node], offset: usize) -> Marks {
    let mut current = nodes;
    let mut marks = Marks::default();
    if let Some((path, _)) = leaf_at(nodes, offset) {
        for index in path {
            match current.get(index) {
                Some(Node::Text(text)) => marks = text.marks,
                Some(Node::Element(element)) => current = &element.children,
                None => break,
            }
        }
    }
    marks
}

/// Character spans of the top-level links in inline content.
pub(crate) fn link_spans(nodes: &[Node]) -> Vec<(usize, usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for (index, node) in nodes.iter().enumerate() {
        let len = node_len(node);
        if let Node::Element(element) = node {
            if element.kind.is_inline() {
                spans.push((index, offset, offset + len));
            }
        }
        offset += len;
    }
    spans
}

/// Replaces the links at the given top-level indices with their children.
pub(crate) fn unwrap_links(nodes: Vec<Node>, indices: &[usize]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.into_iter().enumerate() {
        match node {
            Node::Element(element) if indices.contains(&index) => out.extend(element.children),
            other => out.push(other),
        }
    }
    out
}

/// Inserts a text run at `offset`. Strictly inside a link the run joins the
/// link; at a link boundary it stays outside.
pub(crate) fn insert_inline_text(nodes: &mut Vec<Node>, offset: usize, text: Text) {
    let mut start = 0;
    for node in nodes.iter_mut() {
        let len = node_len(node);
        if let Node::Element(link) = node {
            if link.kind.is_inline() && start < offset && offset < start + len {
                let (left, right) = split_inline(mem::take(&mut link.children), offset - start);
                link.children = concat([left, vec![Node::Text(text)], right]);
                return;
            }
        }
        start += len;
    }
    let (left, right) = split_inline(mem::take(nodes), offset);
    *nodes = concat([left, vec![Node::Text(text)], right]);
}
