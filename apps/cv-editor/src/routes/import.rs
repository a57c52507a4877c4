use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cv::CvData;
use crate::errors::AppError;
use crate::import::{extract_patch, ConsentGate, ImportError, ImportTicket, JSON_MIME};
use crate::state::AppState;

struct Upload {
    file_name: String,
    mime_type: String,
    bytes: Bytes,
}

#[derive(Serialize, Deserialize)]
pub struct ConsentBody {
    pub granted: bool,
}

#[derive(Serialize)]
pub struct DismissResponse {
    pub dismissed: bool,
}

/// GET /api/v1/consent
pub async fn handle_get_consent(State(state): State<AppState>) -> Json<ConsentBody> {
    let granted = ConsentGate::is_granted(state.store.lock().await.storage());
    Json(ConsentBody { granted })
}

/// PUT /api/v1/consent
pub async fn handle_put_consent(
    State(state): State<AppState>,
    Json(req): Json<ConsentBody>,
) -> Result<Json<ConsentBody>, AppError> {
    let mut store = state.store.lock().await;
    if req.granted {
        ConsentGate::grant(store.storage_mut())?;
    } else {
        ConsentGate::revoke(store.storage_mut())?;
    }
    info!(granted = req.granted, "AI consent updated");
    Ok(Json(ConsentBody {
        granted: req.granted,
    }))
}

/// POST /api/v1/import
/// Accepts a multipart `file` field. JSON files are merged directly; other
/// files are sent to the AI extractor, which requires consent.
pub async fn handle_import(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CvData>, AppError> {
    let upload = read_upload(multipart).await?;
    info!(
        file = %upload.file_name,
        mime_type = %upload.mime_type,
        bytes = upload.bytes.len(),
        "import requested"
    );

    let consent = ConsentGate::is_granted(state.store.lock().await.storage());
    let ticket = state.import_session.lock().await.begin()?;

    // Spawned right after `begin` so the ticket is finished even when the
    // request is dropped.
    let task = tokio::spawn(run_import(state.clone(), ticket, consent, upload));
    match task.await {
        Ok(result) => result.map(Json),
        Err(e) => {
            state.import_session.lock().await.finish(ticket);
            Err(anyhow::anyhow!("import task failed: {e}").into())
        }
    }
}

async fn run_import(
    state: AppState,
    ticket: ImportTicket,
    consent: bool,
    upload: Upload,
) -> Result<CvData, AppError> {
    let result = extract_patch(
        state.extractor.as_ref(),
        consent,
        &upload.bytes,
        &upload.mime_type,
    )
    .await;

    if !state.import_session.lock().await.finish(ticket) {
        warn!(file = %upload.file_name, "discarding result of dismissed import");
        return Err(ImportError::Dismissed.into());
    }

    let patch = result?;
    let mut store = state.store.lock().await;
    store.update_data(patch);
    state
        .surfaces
        .lock()
        .await
        .retain(|field, _| store.rich_text(field).is_some());
    info!(file = %upload.file_name, "import merged");
    Ok(store.data().clone())
}

/// DELETE /api/v1/import
pub async fn handle_dismiss_import(State(state): State<AppState>) -> Json<DismissResponse> {
    let dismissed = state.import_session.lock().await.dismiss();
    Json(DismissResponse { dismissed })
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .filter(|mime| !mime.is_empty() && *mime != "application/octet-stream")
            .map(str::to_string)
            .unwrap_or_else(|| mime_from_extension(&file_name).to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        return Ok(Upload {
            file_name,
            mime_type,
            bytes,
        });
    }
    Err(AppError::Validation("Missing multipart field 'file'".to_string()))
}

fn mime_from_extension(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => JSON_MIME,
        "pdf" => "application/pdf",
        "md" => "text/markdown",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("cv.JSON"), JSON_MIME);
        assert_eq!(mime_from_extension("resume.pdf"), "application/pdf");
        assert_eq!(mime_from_extension("notes.md"), "text/markdown");
        assert_eq!(mime_from_extension("noext"), "application/octet-stream");
    }
}
