// HTTP handlers
//
// Three POST endpoints over the pipeline plus a health probe. Uploads land
// in the scratch directory under a random name and are removed by the
// ScratchFile guard on every exit path.

use std::path::{Path, PathBuf};

use axum::extract::{Multipart, State};
use axum::Json;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::llm_engine::provider::{CompletionRequest, Message};
use crate::pipeline::types::{AttributionRecord, SpokenSegment};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// POST /generate - run a raw prompt through the text-generation model.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = body
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::MissingInput("No prompt provided".to_string()))?;

    let request = CompletionRequest {
        messages: vec![Message::user(prompt)],
        max_tokens: Some(state.config.pipeline.max_generated_tokens),
        temperature: None,
    };

    let response = state.llm.complete(request).await?;
    Ok(Json(GenerateResponse {
        response: response.content,
    }))
}

/// POST /transcribe - upload an audio file, get speaker-tagged segments.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<SpokenSegment>>, AppError> {
    let upload = save_upload(&state.config.upload_dir, multipart).await?;
    let segments = state.pipeline.transcribe_file(upload.path()).await?;
    Ok(Json(segments))
}

/// POST /process - full pipeline: transcribe, diarize, summarize, attribute.
pub async fn process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<AttributionRecord>>, AppError> {
    let upload = save_upload(&state.config.upload_dir, multipart).await?;
    let records = state.pipeline.process_file(upload.path()).await?;
    Ok(Json(records))
}

/// GET /health - liveness plus collaborator readiness.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let llm_ready = state.llm.is_ready().await;
    Json(json!({
        "status": "ok",
        "llm_provider": state.llm.provider_name(),
        "llm_ready": llm_ready,
    }))
}

/// An uploaded file persisted to the scratch directory.
/// The file is removed when the guard drops, on success and failure alike.
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "Failed to remove scratch file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Pull the `file` field out of a multipart body and persist it.
async fn save_upload(upload_dir: &Path, mut multipart: Multipart) -> Result<ScratchFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MissingInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload.bin").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read upload: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::MissingInput("Uploaded file is empty".to_string()));
        }

        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;

        // Random name plus the original extension; the client-supplied
        // filename never touches the filesystem.
        let extension = Path::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let path = upload_dir.join(format!("{}.{}", Uuid::new_v4(), extension));

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to save upload: {}", e)))?;

        info!(
            "Saved upload '{}' ({} bytes) to {}",
            original_name,
            data.len(),
            path.display()
        );
        return Ok(ScratchFile { path });
    }

    Err(AppError::MissingInput("No file provided".to_string()))
}
