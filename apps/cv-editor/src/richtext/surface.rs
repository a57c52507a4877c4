//! Binds one rich-text field's HTML value to an editor.
//!
//! The surface emits a new HTML value only after structural edits, and an
//! incoming value is reloaded only when it differs from the value the surface
//! last loaded or emitted, so its own echo never resets the selection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::editor::{BlockKind, Editor};
use super::history::{EditKind, History, Snapshot};
use super::html::deserialize;
use super::node::Mark;
use super::selection::Range;

/// One user interaction with the editing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    InsertText {
        text: String,
    },
    InsertBreak,
    DeleteBackward,
    DeleteForward,
    ToggleMark {
        mark: Mark,
    },
    ToggleBlock {
        block: BlockKind,
    },
    ToggleLink {
        #[serde(default)]
        url: Option<String>,
    },
    Select {
        #[serde(default)]
        range: Option<Range>,
    },
    Undo,
    Redo,
}

#[derive(Debug, Default)]
pub struct EditingSurface {
    editor: Editor,
    history: History,
    /// Last value exchanged with the outside, loaded or emitted.
    last_synced: String,
}

impl EditingSurface {
    pub fn new(html: &str) -> Self {
        let mut surface = Self::default();
        surface.load(html);
        surface
    }

    /// Replaces the content and forgets selection, carried marks and history.
    pub fn load(&mut self, html: &str) {
        self.editor.reset(deserialize(html));
        self.history.clear();
        self.last_synced = html.to_string();
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn html(&self) -> String {
        self.editor.to_html()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Applies a command. Returns the new HTML value when the document
    /// changed, `None` for selection moves and other no-op commands.
    pub fn apply(&mut self, command: Command) -> Option<String> {
        let before = self.snapshot();
        let (changed, kind) = match command {
            Command::InsertText { text } => (self.editor.insert_text(&text), EditKind::Typing),
            Command::InsertBreak => (self.editor.insert_break(), EditKind::Other),
            Command::DeleteBackward => (self.editor.delete_backward(), EditKind::Other),
            Command::DeleteForward => (self.editor.delete_forward(), EditKind::Other),
            Command::ToggleMark { mark } => (self.editor.toggle_mark(mark), EditKind::Other),
            Command::ToggleBlock { block } => (self.editor.toggle_block(block), EditKind::Other),
            Command::ToggleLink { url } => {
                (self.editor.toggle_link(url.as_deref()), EditKind::Other)
            }
            Command::Select { range } => {
                self.editor.set_selection(range);
                self.history.break_run();
                return None;
            }
            Command::Undo => {
                let previous = self.history.undo(before)?;
                return Some(self.restore(previous));
            }
            Command::Redo => {
                let next = self.history.redo(before)?;
                return Some(self.restore(next));
            }
        };

        if !changed {
            return None;
        }
        self.history.record(before, kind);
        Some(self.emit())
    }

    /// Reloads from an externally supplied value unless it is the value this
    /// surface last synced. Returns whether it reloaded.
    pub fn sync_external(&mut self, value: &str) -> bool {
        if value == self.last_synced {
            return false;
        }
        debug!(len = value.len(), "reloading editing surface from external value");
        self.load(value);
        true
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.editor.document().clone(),
            selection: self.editor.selection().cloned(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) -> String {
        self.editor.restore(snapshot.document, snapshot.selection);
        self.emit()
    }

    fn emit(&mut self) -> String {
        let html = self.editor.to_html();
        self.last_synced = html.clone();
        html
    }
}
