//! Importing an existing CV from a file.
//!
//! JSON files are decoded locally. Everything else goes through a
//! `DocumentExtractor` (the Gemini client in production) and requires prior
//! consent. Both sources share the same post-processing, and the result is a
//! `CvPatch` that the caller merges into the store in one step, so a failed
//! import never leaves the CV half-updated.

pub mod consent;
pub mod format;
pub mod gemini;
pub mod prompts;
pub mod session;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::cv::CvPatch;
use format::{format_imported, IdPolicy};

pub use consent::ConsentGate;
pub use format::ensure_html_format;
pub use gemini::GeminiClient;
pub use session::{ImportSession, ImportTicket};

pub const JSON_MIME: &str = "application/json";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("AI import requires consent")]
    ConsentRequired,

    #[error("an import is already in progress")]
    Busy,

    #[error("the import was dismissed")]
    Dismissed,

    #[error("missing GEMINI_API_KEY")]
    MissingCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("the extraction service returned no content")]
    EmptyResponse,
}

/// Turns a document into structured CV data.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: &[u8], mime_type: &str) -> Result<CvPatch, ImportError>;
}

/// Produces the formatted patch for an uploaded file without touching the store.
pub async fn extract_patch(
    extractor: &dyn DocumentExtractor,
    consent_granted: bool,
    document: &[u8],
    mime_type: &str,
) -> Result<CvPatch, ImportError> {
    if mime_type == JSON_MIME {
        let patch: CvPatch = serde_json::from_slice(document)?;
        info!(bytes = document.len(), "decoded JSON import");
        return Ok(format_imported(patch, IdPolicy::KeepUnique));
    }

    if !consent_granted {
        return Err(ImportError::ConsentRequired);
    }

    info!(bytes = document.len(), mime_type, "extracting CV with AI");
    let patch = extractor.extract(document, mime_type).await?;
    Ok(format_imported(patch, IdPolicy::Fresh))
}
