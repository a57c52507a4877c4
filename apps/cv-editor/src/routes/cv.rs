use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::cv::{
    CustomSectionPatch, CvData, ExperiencePatch, HeaderPatch, LinkPatch, RichTextField,
    SettingsPatch,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub summary: String,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Serialize)]
pub struct AddedEntry {
    pub id: String,
}

#[derive(Serialize)]
pub struct AddedLink {
    pub index: usize,
}

/// Result of an operation that is a no-op for unknown ids or indices.
#[derive(Serialize)]
pub struct Changed {
    pub changed: bool,
}

/// GET /api/v1/cv
pub async fn handle_get_cv(State(state): State<AppState>) -> Json<CvData> {
    Json(state.store.lock().await.data().clone())
}

/// PATCH /api/v1/cv/header
pub async fn handle_update_header(
    State(state): State<AppState>,
    Json(patch): Json<HeaderPatch>,
) -> Json<CvData> {
    let mut store = state.store.lock().await;
    store.update_header(patch);
    Json(store.data().clone())
}

/// PUT /api/v1/cv/summary
pub async fn handle_update_summary(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Json<CvData> {
    let mut store = state.store.lock().await;
    store.update_summary(req.summary);
    Json(store.data().clone())
}

/// PATCH /api/v1/cv/settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Json<CvData> {
    let mut store = state.store.lock().await;
    store.update_settings(patch);
    Json(store.data().clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
) -> (StatusCode, Json<AddedEntry>) {
    let id = state.store.lock().await.add_experience();
    (StatusCode::CREATED, Json(AddedEntry { id }))
}

/// PATCH /api/v1/cv/experience/:id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ExperiencePatch>,
) -> Json<Changed> {
    let changed = state.store.lock().await.update_experience_entry(&id, patch);
    Json(Changed { changed })
}

/// DELETE /api/v1/cv/experience/:id
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Changed> {
    let mut store = state.store.lock().await;
    let changed = store.remove_experience(&id);
    if changed {
        state
            .surfaces
            .lock()
            .await
            .remove(&RichTextField::ExperienceDescription(id));
    }
    Json(Changed { changed })
}

/// POST /api/v1/cv/experience/reorder
pub async fn handle_reorder_experience(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Json<Changed> {
    let changed = state.store.lock().await.reorder_experience(req.from, req.to);
    Json(Changed { changed })
}

// ────────────────────────────────────────────────────────────────────────────
// Custom sections
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/custom-sections
pub async fn handle_add_custom_section(
    State(state): State<AppState>,
) -> (StatusCode, Json<AddedEntry>) {
    let id = state.store.lock().await.add_custom_section();
    (StatusCode::CREATED, Json(AddedEntry { id }))
}

/// PATCH /api/v1/cv/custom-sections/:id
pub async fn handle_update_custom_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CustomSectionPatch>,
) -> Json<Changed> {
    let changed = state.store.lock().await.update_custom_section(&id, patch);
    Json(Changed { changed })
}

/// DELETE /api/v1/cv/custom-sections/:id
pub async fn handle_remove_custom_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Changed> {
    let mut store = state.store.lock().await;
    let changed = store.remove_custom_section(&id);
    if changed {
        state
            .surfaces
            .lock()
            .await
            .remove(&RichTextField::CustomSectionDescription(id));
    }
    Json(Changed { changed })
}

/// POST /api/v1/cv/custom-sections/reorder
pub async fn handle_reorder_custom_sections(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Json<Changed> {
    let changed = state
        .store
        .lock()
        .await
        .reorder_custom_sections(req.from, req.to);
    Json(Changed { changed })
}

// ────────────────────────────────────────────────────────────────────────────
// Header links
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/links
pub async fn handle_add_link(State(state): State<AppState>) -> (StatusCode, Json<AddedLink>) {
    let index = state.store.lock().await.add_link();
    (StatusCode::CREATED, Json(AddedLink { index }))
}

/// PATCH /api/v1/cv/links/:index
pub async fn handle_update_link(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(patch): Json<LinkPatch>,
) -> Json<Changed> {
    let changed = state.store.lock().await.update_link(index, patch);
    Json(Changed { changed })
}

/// DELETE /api/v1/cv/links/:index
pub async fn handle_remove_link(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Json<Changed> {
    let changed = state.store.lock().await.remove_link(index);
    Json(Changed { changed })
}

/// POST /api/v1/cv/links/reorder
pub async fn handle_reorder_links(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Json<Changed> {
    let changed = state.store.lock().await.reorder_links(req.from, req.to);
    Json(Changed { changed })
}
