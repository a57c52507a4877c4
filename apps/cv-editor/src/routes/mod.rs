pub mod cv;
pub mod fields;
pub mod health;
pub mod import;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV document
        .route("/api/v1/cv", get(cv::handle_get_cv))
        .route("/api/v1/cv/header", patch(cv::handle_update_header))
        .route("/api/v1/cv/summary", put(cv::handle_update_summary))
        .route("/api/v1/cv/settings", patch(cv::handle_update_settings))
        // Experience
        .route("/api/v1/cv/experience", post(cv::handle_add_experience))
        .route(
            "/api/v1/cv/experience/reorder",
            post(cv::handle_reorder_experience),
        )
        .route(
            "/api/v1/cv/experience/:id",
            patch(cv::handle_update_experience).delete(cv::handle_remove_experience),
        )
        // Custom sections
        .route(
            "/api/v1/cv/custom-sections",
            post(cv::handle_add_custom_section),
        )
        .route(
            "/api/v1/cv/custom-sections/reorder",
            post(cv::handle_reorder_custom_sections),
        )
        .route(
            "/api/v1/cv/custom-sections/:id",
            patch(cv::handle_update_custom_section).delete(cv::handle_remove_custom_section),
        )
        // Header links
        .route("/api/v1/cv/links", post(cv::handle_add_link))
        .route("/api/v1/cv/links/reorder", post(cv::handle_reorder_links))
        .route(
            "/api/v1/cv/links/:index",
            patch(cv::handle_update_link).delete(cv::handle_remove_link),
        )
        // Rich-text editing
        .route("/api/v1/cv/fields/edit", post(fields::handle_edit_field))
        // Import
        .route(
            "/api/v1/consent",
            get(import::handle_get_consent).put(import::handle_put_consent),
        )
        .route(
            "/api/v1/import",
            post(import::handle_import).delete(import::handle_dismiss_import),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::Semaphore;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::cv::{CvPatch, CvStore, RichTextField};
    use crate::import::{DocumentExtractor, ImportError};
    use crate::storage::FileStore;

    struct NoExtractor;

    #[async_trait::async_trait]
    impl DocumentExtractor for NoExtractor {
        async fn extract(&self, _: &[u8], _: &str) -> Result<CvPatch, ImportError> {
            Err(ImportError::MissingCredentials)
        }
    }

    /// Blocks every extraction until the test adds permits.
    struct GatedExtractor {
        gate: Arc<Semaphore>,
    }

    #[async_trait::async_trait]
    impl DocumentExtractor for GatedExtractor {
        async fn extract(&self, _: &[u8], _: &str) -> Result<CvPatch, ImportError> {
            let _permit = self.gate.acquire().await;
            Ok(CvPatch {
                summary: Some("<p>Imported</p>".to_string()),
                ..CvPatch::default()
            })
        }
    }

    fn state(dir: &tempfile::TempDir, extractor: Arc<dyn DocumentExtractor>) -> AppState {
        let config = Config {
            gemini_api_key: None,
            gemini_model: "test".to_string(),
            data_dir: dir.path().to_path_buf(),
            port: 0,
            rust_log: "info".to_string(),
        };
        let store = CvStore::open(FileStore::open(dir.path()).unwrap());
        AppState::new(store, extractor, config)
    }

    fn app(dir: &tempfile::TempDir) -> Router {
        build_router(state(dir, Arc::new(NoExtractor)))
    }

    fn upload_request(file_name: &str, mime_type: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {mime_type}\r\n\r\n{content}\r\n--BOUNDARY--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/import")
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    async fn edit(app: &Router, field: &Value, command: Value) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/cv/fields/edit",
            Some(json!({ "field": field, "command": command })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    fn cursor_at_start() -> Value {
        json!({
            "type": "select",
            "range": {
                "anchor": { "path": [0, 0], "offset": 0 },
                "focus": { "path": [0, 0], "offset": 0 }
            }
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(&app(&dir), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_edit_field_updates_store() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let field = json!({ "kind": "summary" });

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/cv/fields/edit",
            Some(json!({
                "field": field,
                "command": {
                    "type": "select",
                    "range": {
                        "anchor": { "path": [0, 0], "offset": 0 },
                        "focus": { "path": [0, 0], "offset": 11 }
                    }
                }
            })),
        )
        .await;
        assert_eq!(body["changed"], false);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/cv/fields/edit",
            Some(json!({ "field": field, "command": { "type": "toggle_mark", "mark": "bold" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], true);
        assert_eq!(body["toolbar"]["bold"], true);

        let (_, cv) = send(&app, "GET", "/api/v1/cv", None).await;
        assert!(cv["summary"]
            .as_str()
            .unwrap()
            .starts_with("<p><strong>Experience</strong>"));
    }

    #[tokio::test]
    async fn test_missing_field_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            &app(&dir),
            "POST",
            "/api/v1/cv/fields/edit",
            Some(json!({
                "field": { "kind": "experience_description", "id": "nope" },
                "command": { "type": "undo" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reorder_out_of_range_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            &app(&dir),
            "POST",
            "/api/v1/cv/experience/reorder",
            Some(json!({ "from": 0, "to": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], false);
    }

    #[tokio::test]
    async fn test_external_revert_survives_next_edit() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let field = json!({ "kind": "summary" });
        let (_, cv) = send(&app, "GET", "/api/v1/cv", None).await;
        let original = cv["summary"].as_str().unwrap().to_string();

        edit(&app, &field, cursor_at_start()).await;
        edit(&app, &field, json!({ "type": "insert_text", "text": "X" })).await;
        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/cv/summary",
            Some(json!({ "summary": original })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        edit(&app, &field, cursor_at_start()).await;
        let body = edit(&app, &field, json!({ "type": "insert_text", "text": "Y" })).await;
        assert_eq!(body["changed"], true);

        let (_, cv) = send(&app, "GET", "/api/v1/cv", None).await;
        let summary = cv["summary"].as_str().unwrap();
        assert!(summary.starts_with("<p>YExperienced"), "{summary}");
        assert!(!summary.contains("XY"));
    }

    #[tokio::test]
    async fn test_dropped_import_request_releases_session() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let state = state(&dir, Arc::new(GatedExtractor { gate: gate.clone() }));
        let app = build_router(state.clone());
        let (status, _) = send(&app, "PUT", "/api/v1/consent", Some(json!({ "granted": true }))).await;
        assert_eq!(status, StatusCode::OK);

        let first = tokio::spawn({
            let app = app.clone();
            async move { app.oneshot(upload_request("cv.txt", "text/plain", "resume")).await }
        });
        while !state.import_session.lock().await.is_importing() {
            tokio::task::yield_now().await;
        }
        first.abort();
        let _ = first.await;

        gate.add_permits(8);
        while state.import_session.lock().await.is_importing() {
            tokio::task::yield_now().await;
        }

        let response = app
            .clone()
            .oneshot(upload_request("cv.txt", "text/plain", "resume"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.store.lock().await.data().summary, "<p>Imported</p>");
    }

    #[tokio::test]
    async fn test_import_drops_surfaces_of_replaced_entries() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir, Arc::new(NoExtractor));
        let app = build_router(state.clone());
        let (_, cv) = send(&app, "GET", "/api/v1/cv", None).await;
        let old_id = cv["experience"][0]["id"].as_str().unwrap().to_string();

        edit(
            &app,
            &json!({ "kind": "experience_description", "id": old_id }),
            cursor_at_start(),
        )
        .await;
        edit(&app, &json!({ "kind": "summary" }), cursor_at_start()).await;
        assert_eq!(state.surfaces.lock().await.len(), 2);

        let imported = r#"{"experience":[{"title":"Dev","company":"Acme","description":"Built things"}]}"#;
        let response = app
            .clone()
            .oneshot(upload_request("cv.json", "application/json", imported))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let surfaces = state.surfaces.lock().await;
        assert_eq!(surfaces.len(), 1);
        assert!(surfaces.contains_key(&RichTextField::Summary));
    }
}
