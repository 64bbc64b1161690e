// Conv-Insight server binary
//
// Loads the model collaborators once, then serves the pipeline over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use conv_insight::config::AppConfig;
use conv_insight::diarization::{DiarizationConfig, DiarizationEngine};
use conv_insight::embedding::{OllamaEmbedder, OllamaEmbedderConfig};
use conv_insight::llm_engine::provider::LlmProvider;
use conv_insight::llm_engine::providers::{OllamaConfig, OllamaProvider};
use conv_insight::pipeline::ConversationPipeline;
use conv_insight::server::build_router;
use conv_insight::state::AppState;
use conv_insight::whisper_engine::WhisperEngine;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    info!("Starting conv-insight");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .context("Failed to create upload directory")?;

    // Model collaborators are loaded once and shared read-only across requests.
    let whisper = Arc::new(WhisperEngine::new(config.whisper_model_path.clone()));
    whisper
        .load_model()
        .await
        .context("Failed to load Whisper model")?;

    let diarizer = Arc::new(
        DiarizationEngine::new(DiarizationConfig {
            segmentation_model_path: config.segmentation_model_path.clone(),
            embedding_model_path: config.embedding_model_path.clone(),
            max_speakers: config.pipeline.max_speakers,
            similarity_threshold: config.pipeline.speaker_similarity_threshold,
        })
        .context("Failed to initialize diarization engine")?,
    );

    let llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(OllamaConfig {
        base_url: config.ollama_base_url.clone(),
        timeout_secs: config.llm_timeout_secs,
    }));
    match llm.initialize(&config.llm_model).await {
        Ok(()) => info!("LLM provider ready with model '{}'", config.llm_model),
        // The server still starts; /health reports the gap and /generate
        // and /process return 503 until Ollama comes up.
        Err(e) => warn!("LLM provider not ready: {}", e),
    }

    let embedder = Arc::new(OllamaEmbedder::new(OllamaEmbedderConfig {
        base_url: config.ollama_base_url.clone(),
        model: config.embedding_model.clone(),
        timeout_secs: config.llm_timeout_secs,
    }));

    let pipeline = Arc::new(ConversationPipeline::new(
        whisper,
        diarizer,
        llm.clone(),
        embedder,
        config.pipeline.clone(),
        config.language.clone(),
    ));

    let state = AppState {
        pipeline,
        llm,
        config: Arc::new(config.clone()),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
