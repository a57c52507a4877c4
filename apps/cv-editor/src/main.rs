use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_editor::config::Config;
use cv_editor::cv::CvStore;
use cv_editor::import::GeminiClient;
use cv_editor::routes::build_router;
use cv_editor::state::AppState;
use cv_editor::storage::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cv_editor={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV editor v{}", env!("CARGO_PKG_VERSION"));

    // Open the data directory and load the saved CV
    let storage = FileStore::open(config.data_dir.clone())?;
    info!("Data directory: {}", storage.dir().display());
    let store = CvStore::open(storage);

    // Initialize the AI extractor
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    if config.gemini_api_key.is_none() {
        info!("GEMINI_API_KEY not set; AI import disabled, JSON import still available");
    } else {
        info!("Gemini client initialized (model: {})", gemini.model());
    }

    let state = AppState::new(store, Arc::new(gemini), config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
