//! HTML ↔ document conversion.
//!
//! Deserialization runs in three passes: the lexer tokenizes, a small tree
//! builder turns tokens into a raw element tree (closing implied and dangling
//! tags the way a browser would for this subset), and the raw tree is mapped
//! onto the editor's node kinds before normalization.
//!
//! Serialization is the inverse mapping for normalized documents only.

use logos::Logos;
use thiserror::Error;
use tracing::warn;

use super::lexer::{decode_entities, parse_start_tag, StartTag, Token};
use super::node::{Document, Element, ElementKind, Mark, Node, Text};
use super::normalize::normalize_root;

/// Deepest element nesting accepted before the input is rejected.
pub const MAX_DEPTH: usize = 256;

const VOID_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "wbr", "col", "area", "source",
];
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HtmlError {
    #[error("markup nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Parses an HTML fragment, substituting the canonical empty document when
/// the input cannot be parsed. The failure is logged, never returned.
pub fn deserialize(html: &str) -> Document {
    match try_deserialize(html) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to parse rich text value, using empty document: {e}");
            Document::empty()
        }
    }
}

/// Parses an HTML fragment into a normalized document.
pub fn try_deserialize(html: &str) -> Result<Document, HtmlError> {
    if html.trim().is_empty() {
        return Ok(Document::empty());
    }

    let raw = build_tree(html)?;
    let mut nodes = Vec::new();
    for node in raw {
        convert(node, &mut nodes);
    }
    Ok(Document::from_blocks(normalize_root(nodes)))
}

/// Renders a document as HTML. Marks nest as `<strong><em><u>…</u></em></strong>`.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    for block in document.blocks() {
        write_element(block, &mut out);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Raw tree building
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum RawNode {
    Element { tag: StartTag, children: Vec<RawNode> },
    Text(String),
}

struct OpenElement {
    tag: StartTag,
    children: Vec<RawNode>,
}

fn build_tree(html: &str) -> Result<Vec<RawNode>, HtmlError> {
    let mut root: Vec<RawNode> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut raw_text_end: Option<String> = None;

    let mut lexer = Token::lexer(html);
    while let Some(token) = lexer.next() {
        // The token set covers every input, but keep the slice as text if not.
        let token = token.unwrap_or(Token::Text(lexer.slice()));

        if let Some(name) = &raw_text_end {
            if matches!(token, Token::EndTag(end) if end.eq_ignore_ascii_case(name)) {
                raw_text_end = None;
            }
            continue;
        }

        match token {
            Token::Text(text) => append(&mut stack, &mut root, RawNode::Text(decode_entities(text))),
            Token::Lt => append(&mut stack, &mut root, RawNode::Text("<".to_string())),
            Token::Declaration | Token::ProcessingInstruction => {}
            Token::StartTag(raw) => {
                let tag = parse_start_tag(raw);
                if RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
                    if !tag.self_closing {
                        raw_text_end = Some(tag.name);
                    }
                    continue;
                }
                if tag.self_closing || VOID_TAGS.contains(&tag.name.as_str()) {
                    let node = RawNode::Element {
                        tag,
                        children: Vec::new(),
                    };
                    append(&mut stack, &mut root, node);
                    continue;
                }
                close_implied(&mut stack, &mut root, &tag.name);
                if stack.len() >= MAX_DEPTH {
                    return Err(HtmlError::TooDeep { limit: MAX_DEPTH });
                }
                stack.push(OpenElement {
                    tag,
                    children: Vec::new(),
                });
            }
            Token::EndTag(name) => {
                let name = name.to_ascii_lowercase();
                if let Some(position) = stack.iter().rposition(|open| open.tag.name == name) {
                    while stack.len() > position {
                        close_top(&mut stack, &mut root);
                    }
                }
            }
        }
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut root);
    }
    Ok(root)
}

/// Closes elements that the opening tag implicitly ends: a block start ends
/// an open paragraph, and a new list item ends the previous one in the same list.
fn close_implied(stack: &mut Vec<OpenElement>, root: &mut Vec<RawNode>, opening: &str) {
    let closes_paragraph = matches!(
        opening,
        "p" | "ul" | "ol" | "li" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
    );
    if closes_paragraph {
        if let Some(position) = find_open(stack, "p", &["li", "ul", "ol"]) {
            while stack.len() > position {
                close_top(stack, root);
            }
        }
    }
    if opening == "li" {
        if let Some(position) = find_open(stack, "li", &["ul", "ol"]) {
            while stack.len() > position {
                close_top(stack, root);
            }
        }
    }
}

/// Finds the innermost open `name`, not searching past a `boundary` element.
fn find_open(stack: &[OpenElement], name: &str, boundary: &[&str]) -> Option<usize> {
    for (index, open) in stack.iter().enumerate().rev() {
        if open.tag.name == name {
            return Some(index);
        }
        if boundary.contains(&open.tag.name.as_str()) {
            return None;
        }
    }
    None
}

fn append(stack: &mut [OpenElement], root: &mut Vec<RawNode>, node: RawNode) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => root.push(node),
    }
}

fn close_top(stack: &mut Vec<OpenElement>, root: &mut Vec<RawNode>) {
    if let Some(open) = stack.pop() {
        let node = RawNode::Element {
            tag: open.tag,
            children: open.children,
        };
        append(stack, root, node);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Raw tree → document nodes
// ────────────────────────────────────────────────────────────────────────────

fn element_kind(tag: &StartTag) -> Option<ElementKind> {
    match tag.name.as_str() {
        "a" => Some(ElementKind::Link {
            url: tag.attribute("href").unwrap_or_default().to_string(),
        }),
        "p" => Some(ElementKind::Paragraph),
        "ul" => Some(ElementKind::BulletedList),
        "li" => Some(ElementKind::ListItem),
        _ => None,
    }
}

fn mark_for(name: &str) -> Option<Mark> {
    match name {
        "strong" | "b" => Some(Mark::Bold),
        "em" | "i" => Some(Mark::Italic),
        "u" => Some(Mark::Underline),
        _ => None,
    }
}

fn convert(node: RawNode, out: &mut Vec<Node>) {
    let (tag, children) = match node {
        RawNode::Text(text) => {
            out.push(Node::Text(Text::new(text)));
            return;
        }
        RawNode::Element { tag, children } => (tag, children),
    };

    if tag.name == "br" {
        out.push(Node::text("\n"));
        return;
    }

    let mut converted = Vec::new();
    for child in children {
        convert(child, &mut converted);
    }

    if let Some(kind) = element_kind(&tag) {
        out.push(Node::Element(Element::new(kind, converted)));
    } else if let Some(mark) = mark_for(&tag.name) {
        if converted.is_empty() {
            converted.push(Node::Text(Text::empty()));
        }
        out.extend(converted.into_iter().map(|child| apply_mark(child, mark)));
    } else {
        // Unrecognized tag: keep the content, drop the wrapper.
        out.extend(converted);
    }
}

fn apply_mark(node: Node, mark: Mark) -> Node {
    match node {
        Node::Text(mut text) => {
            text.marks.set(mark, true);
            Node::Text(text)
        }
        Node::Element(element) => Node::Element(Element {
            kind: element.kind,
            children: element
                .children
                .into_iter()
                .map(|child| apply_mark(child, mark))
                .collect(),
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => write_text(text, out),
            Node::Element(element) => write_element(element, out),
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    match &element.kind {
        ElementKind::Paragraph => {
            out.push_str("<p>");
            write_nodes(&element.children, out);
            out.push_str("</p>");
        }
        ElementKind::Link { url } => {
            out.push_str("<a href=\"");
            out.push_str(&escape_attribute(url));
            out.push_str("\">");
            write_nodes(&element.children, out);
            out.push_str("</a>");
        }
        ElementKind::BulletedList => {
            out.push_str("<ul>");
            write_nodes(&element.children, out);
            out.push_str("</ul>");
        }
        ElementKind::ListItem => {
            out.push_str("<li>");
            write_nodes(&element.children, out);
            out.push_str("</li>");
        }
    }
}

fn write_text(text: &Text, out: &mut String) {
    let marks = text.marks;
    if marks.bold {
        out.push_str("<strong>");
    }
    if marks.italic {
        out.push_str("<em>");
    }
    if marks.underline {
        out.push_str("<u>");
    }
    out.push_str(&escape_text(&text.text));
    if marks.underline {
        out.push_str("</u>");
    }
    if marks.italic {
        out.push_str("</em>");
    }
    if marks.bold {
        out.push_str("</strong>");
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br>")
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
