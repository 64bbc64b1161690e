// Whisper Engine - model loading and segment-level transcription

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::text_cleaner::clean_repetitive_text;
use crate::audio::TARGET_SAMPLE_RATE;
use crate::pipeline::types::TranscriptSegment;
use crate::pipeline::Transcriber;

pub struct WhisperEngine {
    model_path: PathBuf,
    context: RwLock<Option<WhisperContext>>,
}

impl WhisperEngine {
    /// Create an engine for the given GGML model file. The model is not
    /// loaded until `load_model` is called.
    pub fn new(model_path: PathBuf) -> Self {
        // Suppress verbose whisper.cpp logs
        std::env::set_var("GGML_METAL_LOG_LEVEL", "1");
        std::env::set_var("WHISPER_LOG_LEVEL", "1");

        Self {
            model_path,
            context: RwLock::new(None),
        }
    }

    /// Load the model into memory. Called once at startup.
    pub async fn load_model(&self) -> Result<()> {
        if !self.model_path.exists() {
            return Err(anyhow!(
                "Whisper model not found: {}",
                self.model_path.display()
            ));
        }

        log::info!("Loading Whisper model: {}", self.model_path.display());

        let context_param = WhisperContextParameters {
            use_gpu: true,
            gpu_device: 0,
            ..Default::default()
        };

        let ctx = WhisperContext::new_with_params(
            &self.model_path.to_string_lossy(),
            context_param,
        )
        .map_err(|e| anyhow!("Failed to load Whisper model: {}", e))?;

        *self.context.write().await = Some(ctx);
        log::info!("Whisper model loaded");
        Ok(())
    }

    pub async fn is_model_loaded(&self) -> bool {
        self.context.read().await.is_some()
    }

    /// Transcribe 16 kHz mono samples, keeping per-segment timestamps.
    pub async fn transcribe_segments(
        &self,
        samples: &[f32],
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        let ctx_lock = self.context.read().await;
        let ctx = ctx_lock
            .as_ref()
            .ok_or_else(|| anyhow!("No model loaded. Please load a model first."))?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: 5,
            patience: 1.0,
        });

        let (language_code, should_translate) = match language {
            Some("auto") | None => (None, false),
            Some("auto-translate") => (None, true),
            Some(lang) => (Some(lang), false),
        };
        params.set_language(language_code);
        params.set_translate(should_translate);
        params.set_token_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_non_speech_tokens(true);
        params.set_temperature(0.3);
        params.set_max_initial_ts(1.0);
        params.set_entropy_thold(2.4);
        params.set_logprob_thold(-1.0);
        params.set_no_speech_thold(0.55);
        params.set_single_segment(false);
        params.set_no_context(true);

        let duration_seconds = samples.len() as f64 / TARGET_SAMPLE_RATE as f64;
        log::info!(
            "Transcribing {} samples ({:.1}s duration)",
            samples.len(),
            duration_seconds
        );
        if duration_seconds < 1.0 {
            log::warn!(
                "Audio duration is short ({:.1}s < 1.0s). Consider padding the input audio with silence.",
                duration_seconds
            );
        }

        let mut state = ctx.create_state()?;
        state.full(params, samples)?;

        let num_segments = state.full_n_segments()?;

        let mut segments = Vec::new();
        for i in 0..num_segments {
            let segment_text = match state.full_get_segment_text_lossy(i) {
                Ok(text) => text,
                Err(_) => continue,
            };

            // Whisper reports timestamps in centiseconds
            let start = state.full_get_segment_t0(i).unwrap_or(0) as f64 / 100.0;
            let end = state.full_get_segment_t1(i).unwrap_or(0) as f64 / 100.0;

            let cleaned = clean_repetitive_text(segment_text.trim());
            if cleaned.is_empty() {
                continue;
            }

            segments.push(TranscriptSegment {
                start,
                end,
                text: cleaned,
            });
        }

        log::info!("Transcription produced {} segments", segments.len());
        Ok(segments)
    }
}

#[async_trait]
impl Transcriber for WhisperEngine {
    async fn transcribe(
        &self,
        samples: &[f32],
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        self.transcribe_segments(samples, language).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_engine_starts_without_a_loaded_model() {
        let engine = WhisperEngine::new(PathBuf::from("models/ggml-base.bin"));
        assert!(!engine.is_model_loaded().await);
    }

    #[tokio::test]
    async fn test_load_missing_model_fails() {
        let engine = WhisperEngine::new(PathBuf::from("/nonexistent/model.bin"));
        let result = engine.load_model().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
