mod config;
mod embedding;
mod errors;
mod extract;
mod feedback;
mod llm_client;
mod matching;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::{ModelRegistry, OnnxModelLoader};
use crate::feedback::FeedbackGenerator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Matcher v{}", env!("CARGO_PKG_VERSION"));

    // Embedding model cache, shared by every request for the life of the process
    let models = Arc::new(ModelRegistry::new(Arc::new(OnnxModelLoader::new(
        config.model_cache_dir.clone(),
    ))));
    warm_up_model(models.clone(), config.embedding_model.clone()).await;

    // Feedback chain: Primary (OpenAI) → Secondary (Hugging Face) → Offline
    let feedback = Arc::new(FeedbackGenerator::from_config(&config));
    info!(
        "Feedback backends: {:?} + offline fallback",
        feedback.remote_backends()
    );

    let state = AppState {
        config: config.clone(),
        models,
        feedback,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the scoring model before the first request arrives.
/// A failure here is not fatal: requests retry the load and report it if it still fails.
async fn warm_up_model(models: Arc<ModelRegistry>, name: String) {
    let result = tokio::task::spawn_blocking(move || models.get_model(&name).map(|_| ())).await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Embedding model warm-up failed, will retry on demand: {e}"),
        Err(e) => warn!("Embedding model warm-up task failed: {e}"),
    }
}
