use std::collections::VecDeque;

use super::node::Document;
use super::selection::Range;

pub const HISTORY_LIMIT: usize = 100;

/// Document and selection as they were before an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Option<Range>,
}

/// What kind of edit produced a snapshot. Consecutive `Typing` edits merge
/// into a single undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Typing,
    Other,
}

#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    last_kind: Option<EditKind>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state before an edit that changed the document.
    pub fn record(&mut self, before: Snapshot, kind: EditKind) {
        self.redo.clear();
        let coalesce = kind == EditKind::Typing
            && self.last_kind == Some(EditKind::Typing)
            && !self.undo.is_empty();
        self.last_kind = Some(kind);
        if coalesce {
            return;
        }
        if self.undo.len() == HISTORY_LIMIT {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
    }

    /// Ends any typing run, so the next insertion starts a new step.
    pub fn break_run(&mut self) {
        self.last_kind = None;
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        if self.redo.len() > HISTORY_LIMIT {
            self.redo.remove(0);
        }
        self.last_kind = None;
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.pop_front();
        }
        self.last_kind = None;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.last_kind = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::html::deserialize;

    fn snap(html: &str) -> Snapshot {
        Snapshot {
            document: deserialize(html),
            selection: None,
        }
    }

    #[test]
    fn test_typing_run_is_one_step() {
        let mut history = History::new();
        history.record(snap("<p></p>"), EditKind::Typing);
        history.record(snap("<p>a</p>"), EditKind::Typing);
        history.record(snap("<p>ab</p>"), EditKind::Typing);
        let restored = history.undo(snap("<p>abc</p>")).unwrap();
        assert_eq!(restored, snap("<p></p>"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new();
        history.record(snap("<p>a</p>"), EditKind::Other);
        history.undo(snap("<p>b</p>")).unwrap();
        assert!(history.can_redo());
        history.record(snap("<p>a</p>"), EditKind::Other);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_stack_is_bounded() {
        let mut history = History::new();
        for i in 0..(HISTORY_LIMIT + 20) {
            history.record(snap(&format!("<p>{i}</p>")), EditKind::Other);
        }
        let mut steps = 0;
        let mut current = snap("<p>end</p>");
        while let Some(previous) = history.undo(current.clone()) {
            current = previous;
            steps += 1;
        }
        assert_eq!(steps, HISTORY_LIMIT);
        assert_eq!(current, snap("<p>20</p>"));
    }
}
