use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::cv::{CvStore, RichTextField};
use crate::import::{DocumentExtractor, ImportSession};
use crate::richtext::EditingSurface;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Lock order is store, then surfaces, then import session. The store lock is
/// never held across an extraction call.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<CvStore<FileStore>>>,
    /// One editing surface per rich-text field, created on first edit.
    pub surfaces: Arc<Mutex<HashMap<RichTextField, EditingSurface>>>,
    pub import_session: Arc<Mutex<ImportSession>>,
    /// Pluggable extractor. Default: GeminiClient.
    pub extractor: Arc<dyn DocumentExtractor>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: CvStore<FileStore>, extractor: Arc<dyn DocumentExtractor>, config: Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            surfaces: Arc::new(Mutex::new(HashMap::new())),
            import_session: Arc::new(Mutex::new(ImportSession::new())),
            extractor,
            config,
        }
    }
}
