use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cv::RichTextField;
use crate::errors::AppError;
use crate::richtext::{BlockKind, Command, EditingSurface, Editor, Mark, Range};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EditFieldRequest {
    pub field: RichTextField,
    pub command: Command,
}

/// Which toolbar buttons show as active for the current selection.
#[derive(Serialize)]
pub struct ToolbarState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub bulleted_list: bool,
    pub link: bool,
}

impl ToolbarState {
    fn of(editor: &Editor) -> Self {
        Self {
            bold: editor.is_mark_active(Mark::Bold),
            italic: editor.is_mark_active(Mark::Italic),
            underline: editor.is_mark_active(Mark::Underline),
            bulleted_list: editor.is_block_active(BlockKind::BulletedList),
            link: editor.is_link_active(),
        }
    }
}

#[derive(Serialize)]
pub struct EditFieldResponse {
    pub html: String,
    pub changed: bool,
    pub selection: Option<Range>,
    pub toolbar: ToolbarState,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// POST /api/v1/cv/fields/edit
/// Applies one editor command to a rich-text field and stores the result
/// when the document changed.
pub async fn handle_edit_field(
    State(state): State<AppState>,
    Json(req): Json<EditFieldRequest>,
) -> Result<Json<EditFieldResponse>, AppError> {
    let mut store = state.store.lock().await;
    let current = store
        .rich_text(&req.field)
        .ok_or_else(|| AppError::NotFound(format!("No rich-text field {}", req.field)))?
        .to_string();

    let mut surfaces = state.surfaces.lock().await;
    let surface = surfaces
        .entry(req.field.clone())
        .or_insert_with(|| EditingSurface::new(&current));
    if surface.sync_external(&current) {
        debug!(field = %req.field, "field changed outside the editor, reloaded");
    }

    let emitted = surface.apply(req.command);
    if let Some(html) = &emitted {
        store.set_rich_text(&req.field, html.clone());
    }

    Ok(Json(EditFieldResponse {
        html: surface.html(),
        changed: emitted.is_some(),
        selection: surface.editor().selection().cloned(),
        toolbar: ToolbarState::of(surface.editor()),
        can_undo: surface.can_undo(),
        can_redo: surface.can_redo(),
    }))
}
