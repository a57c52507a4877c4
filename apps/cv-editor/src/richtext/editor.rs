//! Editing operations over a document and its selection.
//!
//! Every mutation converts the selection into text-block positions, edits a
//! `FlatDocument`, rebuilds a normalized tree and re-resolves the selection
//! against it. A selection that does not resolve makes the operation a no-op.
//! Mutations return `true` only when the document actually changed.

use std::mem;

use serde::{Deserialize, Serialize};

use super::flat::{
    concat, for_each_text, insert_inline_text, link_spans, marks_at, marks_in_range,
    point_at, position_of, slice_inline, split_inline, unwrap_links, FlatDocument, TextBlock,
};
use super::html::{deserialize, serialize};
use super::node::{Document, Element, Mark, Marks, Node, Text};
use super::selection::{Position, Range};

/// Block formats the toolbar can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    BulletedList,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    anchor: Position,
    focus: Position,
}

impl Span {
    fn start(&self) -> Position {
        self.anchor.min(self.focus)
    }

    fn end(&self) -> Position {
        self.anchor.max(self.focus)
    }

    fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Per-block `[start, end)` offsets for every block the span touches.
    fn block_ranges(&self, flat: &FlatDocument) -> Vec<(usize, usize, usize)> {
        let (start, end) = (self.start(), self.end());
        (start.block..=end.block)
            .filter(|index| *index < flat.blocks.len())
            .map(|index| {
                let from = if index == start.block { start.offset } else { 0 };
                let to = if index == end.block {
                    end.offset
                } else {
                    flat.block_len(index)
                };
                (index, from, to)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    document: Document,
    selection: Option<Range>,
    /// Formatting carried by a collapsed cursor, applied to the next insert.
    pending_marks: Option<Marks>,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: None,
            pending_marks: None,
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(deserialize(html))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn pending_marks(&self) -> Option<Marks> {
        self.pending_marks
    }

    pub fn to_html(&self) -> String {
        serialize(&self.document)
    }

    /// Replaces the document and drops selection and carried formatting.
    pub fn reset(&mut self, document: Document) {
        self.document = document;
        self.selection = None;
        self.pending_marks = None;
    }

    /// Restores a document and selection snapshot (used by undo/redo).
    pub(crate) fn restore(&mut self, document: Document, selection: Option<Range>) {
        self.document = document;
        self.selection = selection.filter(|range| self.span_of(range).is_some());
        self.pending_marks = None;
    }

    /// Moves the selection. Ranges that do not resolve leave it unchanged.
    pub fn select(&mut self, range: Range) -> bool {
        if self.span_of(&range).is_none() {
            return false;
        }
        if self.selection.as_ref() != Some(&range) {
            self.pending_marks = None;
        }
        self.selection = Some(range);
        true
    }

    pub fn deselect(&mut self) {
        self.selection = None;
        self.pending_marks = None;
    }

    pub fn set_selection(&mut self, range: Option<Range>) -> bool {
        match range {
            Some(range) => self.select(range),
            None => {
                self.deselect();
                true
            }
        }
    }

    fn span_of(&self, range: &Range) -> Option<Span> {
        Some(Span {
            anchor: position_of(&self.document, &range.anchor)?,
            focus: position_of(&self.document, &range.focus)?,
        })
    }

    fn span(&self) -> Option<Span> {
        self.selection.as_ref().and_then(|range| self.span_of(range))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Queries
    // ────────────────────────────────────────────────────────────────────────

    /// Marks in effect at the cursor: carried marks first, else the leaf's.
    fn cursor_marks(&self, flat: &FlatDocument, at: Position) -> Marks {
        self.pending_marks.unwrap_or_else(|| {
            flat.blocks
                .get(at.block)
                .map(|block| marks_at(&block.children, at.offset))
                .unwrap_or_default()
        })
    }

    pub fn is_mark_active(&self, mark: Mark) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let flat = FlatDocument::from_document(&self.document);
        if span.is_collapsed() {
            return self.cursor_marks(&flat, span.anchor).has(mark);
        }
        span.block_ranges(&flat).into_iter().any(|(index, from, to)| {
            marks_in_range(&flat.blocks[index].children, from, to)
                .iter()
                .any(|marks| marks.has(mark))
        })
    }

    pub fn is_block_active(&self, kind: BlockKind) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let flat = FlatDocument::from_document(&self.document);
        let (start, end) = (span.start().block, span.end().block);
        flat.blocks
            .get(start..=end)
            .unwrap_or_default()
            .iter()
            .any(|block| match kind {
                BlockKind::Paragraph => block.list.is_none(),
                BlockKind::BulletedList => block.list.is_some(),
            })
    }

    pub fn is_link_active(&self) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let flat = FlatDocument::from_document(&self.document);
        !touched_links(&flat, &span).is_empty()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Formatting
    // ────────────────────────────────────────────────────────────────────────

    /// Adds the mark to the selection, or removes it when any selected text
    /// already carries it. A collapsed cursor toggles the carried formatting.
    pub fn toggle_mark(&mut self, mark: Mark) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let active = self.is_mark_active(mark);
        let mut flat = FlatDocument::from_document(&self.document);

        if span.is_collapsed() {
            let current = self.cursor_marks(&flat, span.anchor);
            self.pending_marks = Some(if active {
                current.without(mark)
            } else {
                current.with(mark)
            });
            return false;
        }

        for (index, from, to) in span.block_ranges(&flat) {
            if from >= to {
                continue;
            }
            let block = &mut flat.blocks[index];
            let (left, mut middle, right) = slice_inline(mem::take(&mut block.children), from, to);
            for_each_text(&mut middle, &mut |text| text.marks.set(mark, !active));
            block.children = concat([left, middle, right]);
        }
        self.commit(flat, span.anchor, span.focus)
    }

    /// Toggles the block format of every block the selection touches.
    pub fn toggle_block(&mut self, kind: BlockKind) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let active = self.is_block_active(kind);
        let mut flat = FlatDocument::from_document(&self.document);

        // Selected blocks always leave their current list; a list toggle that
        // was not active then puts them into one fresh list.
        let list = match (kind, active) {
            (BlockKind::BulletedList, false) => Some(flat.fresh_list()),
            _ => None,
        };
        let (start, end) = (span.start().block, span.end().block);
        for block in flat.blocks.iter_mut().take(end + 1).skip(start) {
            block.list = list;
        }
        self.commit(flat, span.anchor, span.focus)
    }

    /// Removes links touched by the selection, or wraps the selection in a
    /// new link. An absent or blank url aborts the wrap.
    pub fn toggle_link(&mut self, url: Option<&str>) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let mut flat = FlatDocument::from_document(&self.document);

        let touched = touched_links(&flat, &span);
        if !touched.is_empty() {
            for (index, links) in touched {
                let block = &mut flat.blocks[index];
                block.children = unwrap_links(mem::take(&mut block.children), &links);
            }
            return self.commit(flat, span.anchor, span.focus);
        }

        let url = match url.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => return false,
        };

        if span.is_collapsed() {
            let at = span.anchor;
            let Some(block) = flat.blocks.get_mut(at.block) else {
                return false;
            };
            let (left, right) = split_inline(mem::take(&mut block.children), at.offset);
            let link = Element::link(url, vec![Node::text(url)]);
            block.children = concat([left, vec![Node::Element(link)], right]);
            let cursor = Position::new(at.block, at.offset + url.chars().count());
            return self.commit(flat, cursor, cursor);
        }

        for (index, from, to) in span.block_ranges(&flat) {
            if from >= to {
                continue;
            }
            let block = &mut flat.blocks[index];
            let (left, middle, right) = slice_inline(mem::take(&mut block.children), from, to);
            let link = Element::link(url, middle);
            block.children = concat([left, vec![Node::Element(link)], right]);
        }
        let end = span.end();
        self.commit(flat, end, end)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Text editing
    // ────────────────────────────────────────────────────────────────────────

    pub fn insert_text(&mut self, text: &str) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        if text.is_empty() {
            return false;
        }
        let mut flat = FlatDocument::from_document(&self.document);
        let at = delete_span(&mut flat, &span);
        let marks = self.cursor_marks(&flat, at);

        let Some(block) = flat.blocks.get_mut(at.block) else {
            return false;
        };
        insert_inline_text(&mut block.children, at.offset, Text::marked(text, marks));
        let cursor = Position::new(at.block, at.offset + text.chars().count());
        let changed = self.commit(flat, cursor, cursor);
        self.pending_marks = None;
        changed
    }

    /// Splits the current block at the cursor. The new block keeps the
    /// original's format and list membership.
    pub fn insert_break(&mut self) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        let mut flat = FlatDocument::from_document(&self.document);
        let at = delete_span(&mut flat, &span);
        let Some(block) = flat.blocks.get_mut(at.block) else {
            return false;
        };
        let (left, right) = split_inline(mem::take(&mut block.children), at.offset);
        block.children = left;
        let next = TextBlock {
            list: block.list,
            children: right,
        };
        flat.blocks.insert(at.block + 1, next);
        let cursor = Position::new(at.block + 1, 0);
        self.commit(flat, cursor, cursor)
    }

    /// Deletes the selected content, or the character before a collapsed
    /// cursor. At the start of a block the block merges into the previous one.
    pub fn delete_backward(&mut self) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        if !span.is_collapsed() {
            return self.delete_selection();
        }
        let at = span.anchor;
        let mut flat = FlatDocument::from_document(&self.document);

        let cursor = if at.offset > 0 {
            remove_range(&mut flat, Position::new(at.block, at.offset - 1), at);
            Position::new(at.block, at.offset - 1)
        } else if at.block > 0 {
            let previous_len = flat.block_len(at.block - 1);
            merge_into_previous(&mut flat, at.block);
            Position::new(at.block - 1, previous_len)
        } else {
            return false;
        };
        self.commit(flat, cursor, cursor)
    }

    /// Deletes the selected content, or the character after a collapsed
    /// cursor. At the end of a block the next block merges into this one.
    pub fn delete_forward(&mut self) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        if !span.is_collapsed() {
            return self.delete_selection();
        }
        let at = span.anchor;
        let mut flat = FlatDocument::from_document(&self.document);

        if at.offset < flat.block_len(at.block) {
            remove_range(&mut flat, at, Position::new(at.block, at.offset + 1));
        } else if at.block + 1 < flat.blocks.len() {
            merge_into_previous(&mut flat, at.block + 1);
        } else {
            return false;
        }
        self.commit(flat, at, at)
    }

    pub fn delete_selection(&mut self) -> bool {
        let Some(span) = self.span() else {
            return false;
        };
        if span.is_collapsed() {
            return false;
        }
        let mut flat = FlatDocument::from_document(&self.document);
        let cursor = delete_span(&mut flat, &span);
        self.commit(flat, cursor, cursor)
    }

    /// Rebuilds the tree from `flat` and re-resolves the selection.
    fn commit(&mut self, flat: FlatDocument, anchor: Position, focus: Position) -> bool {
        let document = flat.into_document();
        let changed = document != self.document;
        let selection = match (point_at(&document, anchor), point_at(&document, focus)) {
            (Some(anchor), Some(focus)) => Some(Range::new(anchor, focus)),
            _ => None,
        };
        self.document = document;
        self.selection = selection;
        changed
    }
}

/// Top-level link indices touched by the span, per block. A collapsed cursor
/// touches a link when it sits inside or at either edge of it.
fn touched_links(flat: &FlatDocument, span: &Span) -> Vec<(usize, Vec<usize>)> {
    let collapsed = span.is_collapsed();
    span.block_ranges(flat)
        .into_iter()
        .filter_map(|(index, from, to)| {
            let links: Vec<usize> = link_spans(&flat.blocks[index].children)
                .into_iter()
                .filter(|(_, start, end)| {
                    if collapsed {
                        *start <= from && from <= *end
                    } else {
                        *start < to && from < *end
                    }
                })
                .map(|(link, _, _)| link)
                .collect();
            (!links.is_empty()).then_some((index, links))
        })
        .collect()
}

/// Removes the span's content and returns the collapsed cursor position.
fn delete_span(flat: &mut FlatDocument, span: &Span) -> Position {
    let (start, end) = (span.start(), span.end());
    if !span.is_collapsed() {
        remove_range(flat, start, end);
    }
    start
}

fn remove_range(flat: &mut FlatDocument, start: Position, end: Position) {
    if start.block >= flat.blocks.len() || end.block >= flat.blocks.len() {
        return;
    }
    if start.block == end.block {
        let block = &mut flat.blocks[start.block];
        let (left, _, right) = slice_inline(mem::take(&mut block.children), start.offset, end.offset);
        block.children = concat([left, Vec::new(), right]);
        return;
    }
    let tail = {
        let last = &mut flat.blocks[end.block];
        split_inline(mem::take(&mut last.children), end.offset).1
    };
    let first = &mut flat.blocks[start.block];
    let head = split_inline(mem::take(&mut first.children), start.offset).0;
    first.children = concat([head, Vec::new(), tail]);
    flat.blocks.drain(start.block + 1..=end.block);
}

fn merge_into_previous(flat: &mut FlatDocument, index: usize) {
    if index == 0 || index >= flat.blocks.len() {
        return;
    }
    let removed = flat.blocks.remove(index);
    flat.blocks[index - 1].children.extend(removed.children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::selection::Point;

    fn editor(html: &str) -> Editor {
        Editor::from_html(html)
    }

    fn select(editor: &mut Editor, anchor: (&[usize], usize), focus: (&[usize], usize)) {
        let range = Range::new(
            Point::new(anchor.0.to_vec(), anchor.1),
            Point::new(focus.0.to_vec(), focus.1),
        );
        assert!(editor.select(range), "selection should resolve");
    }

    fn cursor(editor: &mut Editor, path: &[usize], offset: usize) {
        select(editor, (path, offset), (path, offset));
    }

    fn contains_nested_list(document: &Document) -> bool {
        document.blocks().iter().any(|block| {
            block.children.iter().filter_map(Node::as_element).any(|item| {
                item.children
                    .iter()
                    .filter_map(Node::as_element)
                    .any(|inner| inner.kind == crate::richtext::node::ElementKind::BulletedList)
            })
        })
    }

    #[test]
    fn test_toggle_bold_on_range() {
        let mut ed = editor("<p>Hello world</p>");
        select(&mut ed, (&[0, 0], 6), (&[0, 0], 11));
        assert!(ed.toggle_mark(Mark::Bold));
        assert_eq!(ed.to_html(), "<p>Hello <strong>world</strong></p>");
        assert!(ed.is_mark_active(Mark::Bold));
    }

    #[test]
    fn test_toggle_mark_twice_restores_document() {
        let mut ed = editor("<p>Hello <em>big</em> world</p>");
        let before = ed.document().clone();
        select(&mut ed, (&[0, 0], 2), (&[0, 2], 3));
        assert!(ed.toggle_mark(Mark::Bold));
        assert_ne!(ed.document(), &before);
        assert!(ed.toggle_mark(Mark::Bold));
        assert_eq!(ed.document(), &before);
    }

    #[test]
    fn test_toggle_mark_removes_when_partially_active() {
        let mut ed = editor("<p>ab<strong>cd</strong></p>");
        select(&mut ed, (&[0, 0], 0), (&[0, 1], 2));
        assert!(ed.is_mark_active(Mark::Bold));
        assert!(ed.toggle_mark(Mark::Bold));
        assert_eq!(ed.to_html(), "<p>abcd</p>");
    }

    #[test]
    fn test_backwards_selection_is_preserved() {
        let mut ed = editor("<p>Hello world</p>");
        select(&mut ed, (&[0, 0], 11), (&[0, 0], 6));
        ed.toggle_mark(Mark::Italic);
        let range = ed.selection().unwrap();
        assert_eq!(range.anchor, Point::new(vec![0, 1], 5));
        assert_eq!(range.focus, Point::new(vec![0, 0], 6));
    }

    #[test]
    fn test_collapsed_toggle_mark_carries_formatting() {
        let mut ed = editor("<p>ab</p>");
        cursor(&mut ed, &[0, 0], 2);
        assert!(!ed.toggle_mark(Mark::Bold));
        assert_eq!(ed.to_html(), "<p>ab</p>");
        assert!(ed.is_mark_active(Mark::Bold));
        assert!(ed.insert_text("cd"));
        assert_eq!(ed.to_html(), "<p>ab<strong>cd</strong></p>");
        assert_eq!(ed.pending_marks(), None);
        assert!(ed.insert_text("e"));
        assert_eq!(ed.to_html(), "<p>ab<strong>cde</strong></p>");
    }

    #[test]
    fn test_toggle_bulleted_list_and_back() {
        let mut ed = editor("<p>one</p><p>two</p>");
        cursor(&mut ed, &[1, 0], 1);
        assert!(ed.toggle_block(BlockKind::BulletedList));
        assert_eq!(ed.to_html(), "<p>one</p><ul><li>two</li></ul>");
        assert!(ed.is_block_active(BlockKind::BulletedList));
        assert_eq!(ed.selection().unwrap().anchor, Point::new(vec![1, 0, 0], 1));

        assert!(ed.toggle_block(BlockKind::BulletedList));
        assert_eq!(ed.to_html(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_toggle_list_splits_existing_list() {
        let mut ed = editor("<ul><li>a</li><li>b</li><li>c</li></ul>");
        cursor(&mut ed, &[0, 1, 0], 0);
        assert!(ed.toggle_block(BlockKind::BulletedList));
        assert_eq!(
            ed.to_html(),
            "<ul><li>a</li></ul><p>b</p><ul><li>c</li></ul>"
        );
    }

    #[test]
    fn test_toggle_list_over_mixed_selection_never_nests() {
        let mut ed = editor("<p>a</p><ul><li>b</li></ul><p>c</p>");
        select(&mut ed, (&[0, 0], 0), (&[2, 0], 1));
        ed.toggle_block(BlockKind::BulletedList);
        assert_eq!(ed.to_html(), "<p>a</p><p>b</p><p>c</p>");
        ed.toggle_block(BlockKind::BulletedList);
        assert_eq!(ed.to_html(), "<ul><li>a</li><li>b</li><li>c</li></ul>");
        assert!(!contains_nested_list(ed.document()));
        for _ in 0..3 {
            ed.toggle_block(BlockKind::BulletedList);
            assert!(!contains_nested_list(ed.document()));
        }
    }

    #[test]
    fn test_paragraph_toggle_unwraps_list() {
        let mut ed = editor("<ul><li>a</li></ul>");
        cursor(&mut ed, &[0, 0, 0], 0);
        assert!(!ed.is_block_active(BlockKind::Paragraph));
        assert!(ed.toggle_block(BlockKind::Paragraph));
        assert_eq!(ed.to_html(), "<p>a</p>");
    }

    #[test]
    fn test_wrap_selection_in_link() {
        let mut ed = editor("<p>visit my site</p>");
        select(&mut ed, (&[0, 0], 9), (&[0, 0], 13));
        assert!(!ed.is_link_active());
        assert!(ed.toggle_link(Some("https://example.com")));
        assert_eq!(
            ed.to_html(),
            r#"<p>visit my <a href="https://example.com">site</a></p>"#
        );
        assert!(ed.selection().unwrap().is_collapsed());
    }

    #[test]
    fn test_collapsed_link_inserts_url_text() {
        let mut ed = editor("<p>go </p>");
        cursor(&mut ed, &[0, 0], 3);
        assert!(ed.toggle_link(Some("https://x.dev")));
        assert_eq!(
            ed.to_html(),
            r#"<p>go <a href="https://x.dev">https://x.dev</a></p>"#
        );
        assert!(ed.is_link_active());
    }

    #[test]
    fn test_unwrap_link_keeps_text() {
        let mut ed = editor(r#"<p>see <a href="https://x.dev"><strong>this</strong></a> now</p>"#);
        cursor(&mut ed, &[0, 1, 0], 2);
        assert!(ed.is_link_active());
        assert!(ed.toggle_link(None));
        assert_eq!(ed.to_html(), "<p>see <strong>this</strong> now</p>");
    }

    #[test]
    fn test_empty_url_aborts_link() {
        let mut ed = editor("<p>text</p>");
        select(&mut ed, (&[0, 0], 0), (&[0, 0], 4));
        let before = ed.document().clone();
        assert!(!ed.toggle_link(None));
        assert!(!ed.toggle_link(Some("   ")));
        assert_eq!(ed.document(), &before);
    }

    #[test]
    fn test_unresolved_selection_is_noop() {
        let mut ed = editor("<p>text</p>");
        assert!(!ed.toggle_mark(Mark::Bold));
        assert!(!ed.select(Range::collapsed(Point::new(vec![3, 0], 0))));
        assert!(!ed.select(Range::collapsed(Point::new(vec![0, 0], 99))));
        assert!(!ed.toggle_block(BlockKind::BulletedList));
        assert!(!ed.toggle_link(Some("https://x.dev")));
        assert!(!ed.insert_text("x"));
        assert_eq!(ed.to_html(), "<p>text</p>");
    }

    #[test]
    fn test_insert_and_delete_text() {
        let mut ed = editor("<p>helo</p>");
        cursor(&mut ed, &[0, 0], 3);
        assert!(ed.insert_text("l"));
        assert_eq!(ed.to_html(), "<p>hello</p>");
        assert!(ed.delete_backward());
        assert_eq!(ed.to_html(), "<p>helo</p>");
        assert!(ed.delete_forward());
        assert_eq!(ed.to_html(), "<p>hel</p>");
    }

    #[test]
    fn test_typing_inside_link_extends_it() {
        let mut ed = editor(r#"<p><a href="u">ab</a></p>"#);
        cursor(&mut ed, &[0, 0, 0], 1);
        ed.insert_text("X");
        assert_eq!(ed.to_html(), r#"<p><a href="u">aXb</a></p>"#);
    }

    #[test]
    fn test_break_and_merge_blocks() {
        let mut ed = editor("<ul><li>abcd</li></ul>");
        cursor(&mut ed, &[0, 0, 0], 2);
        assert!(ed.insert_break());
        assert_eq!(ed.to_html(), "<ul><li>ab</li><li>cd</li></ul>");
        assert_eq!(ed.selection().unwrap().anchor, Point::new(vec![0, 1, 0], 0));
        assert!(ed.delete_backward());
        assert_eq!(ed.to_html(), "<ul><li>abcd</li></ul>");
        assert_eq!(ed.selection().unwrap().anchor, Point::new(vec![0, 0, 0], 2));
    }

    #[test]
    fn test_delete_across_blocks() {
        let mut ed = editor("<p>abc</p><ul><li>def</li></ul><p>ghi</p>");
        select(&mut ed, (&[0, 0], 1), (&[2, 0], 2));
        assert!(ed.delete_selection());
        assert_eq!(ed.to_html(), "<p>ai</p>");
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut ed = editor("<p>abc</p>");
        cursor(&mut ed, &[0, 0], 0);
        assert!(!ed.delete_backward());
    }

    #[test]
    fn test_toggle_sequences_round_trip() {
        let mut ed = editor("");
        cursor(&mut ed, &[0, 0], 0);
        ed.insert_text("first line");
        ed.insert_break();
        ed.insert_text("second line");
        select(&mut ed, (&[0, 0], 0), (&[1, 0], 6));
        let check = |ed: &Editor| {
            let html = ed.to_html();
            assert_eq!(&deserialize(&html), ed.document(), "html: {html}");
        };
        ed.toggle_mark(Mark::Bold);
        check(&ed);
        ed.toggle_block(BlockKind::BulletedList);
        check(&ed);
        ed.toggle_link(Some("https://example.com/?q=\"x\"&y=1"));
        check(&ed);
        ed.toggle_mark(Mark::Underline);
        check(&ed);
        ed.toggle_link(None);
        check(&ed);
        ed.toggle_block(BlockKind::Paragraph);
        check(&ed);
    }

    mod random_edits {
        use proptest::prelude::*;

        use super::*;
        use crate::richtext::node::ElementKind;

        #[derive(Debug, Clone)]
        enum Step {
            Select((usize, usize), (usize, usize)),
            Mark(Mark),
            Block(BlockKind),
            Link(Option<String>),
            Insert(String),
            Break,
            Backspace,
            Delete,
        }

        fn step() -> impl Strategy<Value = Step> {
            let point = (0usize..16, 0usize..16);
            prop_oneof![
                3 => (point.clone(), point).prop_map(|(anchor, focus)| Step::Select(anchor, focus)),
                2 => prop_oneof![Just(Mark::Bold), Just(Mark::Italic), Just(Mark::Underline)]
                    .prop_map(Step::Mark),
                2 => prop_oneof![Just(BlockKind::Paragraph), Just(BlockKind::BulletedList)]
                    .prop_map(Step::Block),
                1 => proptest::option::of("(https://[a-z]{1,6}\\.dev)?").prop_map(Step::Link),
                2 => "[a-z &<]{1,5}".prop_map(Step::Insert),
                1 => Just(Step::Break),
                1 => Just(Step::Backspace),
                1 => Just(Step::Delete),
            ]
        }

        fn leaves(document: &Document) -> Vec<(Vec<usize>, usize)> {
            fn walk(nodes: &[Node], path: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, usize)>) {
                for (index, node) in nodes.iter().enumerate() {
                    path.push(index);
                    match node {
                        Node::Text(text) => out.push((path.clone(), text.len())),
                        Node::Element(element) => walk(&element.children, path, out),
                    }
                    path.pop();
                }
            }
            let mut out = Vec::new();
            let mut path = Vec::new();
            for (index, block) in document.blocks().iter().enumerate() {
                path.push(index);
                walk(&block.children, &mut path, &mut out);
                path.pop();
            }
            out
        }

        fn point_for(document: &Document, (leaf, offset): (usize, usize)) -> Point {
            let leaves = leaves(document);
            let (path, len) = &leaves[leaf % leaves.len()];
            Point::new(path.clone(), offset % (len + 1))
        }

        fn run(ed: &mut Editor, step: Step) {
            match step {
                Step::Select(anchor, focus) => {
                    let range = Range::new(
                        point_for(ed.document(), anchor),
                        point_for(ed.document(), focus),
                    );
                    ed.select(range);
                }
                Step::Mark(mark) => {
                    ed.toggle_mark(mark);
                }
                Step::Block(kind) => {
                    ed.toggle_block(kind);
                }
                Step::Link(url) => {
                    ed.toggle_link(url.as_deref());
                }
                Step::Insert(text) => {
                    ed.insert_text(&text);
                }
                Step::Break => {
                    ed.insert_break();
                }
                Step::Backspace => {
                    ed.delete_backward();
                }
                Step::Delete => {
                    ed.delete_forward();
                }
            }
        }

        fn has_nested_list(element: &Element, in_list: bool) -> bool {
            let is_list = element.kind == ElementKind::BulletedList;
            (is_list && in_list)
                || element
                    .children
                    .iter()
                    .filter_map(Node::as_element)
                    .any(|child| has_nested_list(child, in_list || is_list))
        }

        proptest! {
            #[test]
            fn test_edit_sequences_keep_normal_form(
                start in prop_oneof![
                    Just(""),
                    Just("<p>Hello <em>world</em></p><ul><li>one</li><li><a href=\"https://a.dev\">two</a></li></ul>"),
                ],
                steps in proptest::collection::vec(step(), 1..25),
            ) {
                let mut ed = editor(start);
                for step in steps {
                    run(&mut ed, step);
                    let html = ed.to_html();
                    prop_assert_eq!(&deserialize(&html), ed.document(), "html: {}", html);
                    prop_assert!(
                        !ed.document().blocks().iter().any(|block| has_nested_list(block, false)),
                        "nested list in {}",
                        html
                    );
                }
            }
        }
    }
}
