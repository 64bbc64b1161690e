//! Conversation analysis pipeline
//!
//! The HTTP layer depends on the adapter traits here ([`Transcriber`],
//! [`Diarizer`]) instead of the concrete model backends, which keeps
//! request handling decoupled from inference code.
//!
//! Control flow for one upload: decode -> transcribe + diarize -> assign
//! speakers -> merge turns -> summarize -> attribute.

pub mod attribution;
pub mod speakers;
pub mod summary;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::audio::decode_audio_file;
use crate::config::PipelineConfig;
use crate::embedding::SentenceEmbedder;
use crate::error::AppError;
use crate::llm_engine::provider::{CompletionRequest, LlmProvider, Message};

use types::{AttributionRecord, MergedTurn, SpeakerInterval, SpokenSegment, TranscriptSegment};

/// Speech-to-text backend contract.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe 16 kHz mono samples into timed segments.
    async fn transcribe(
        &self,
        samples: &[f32],
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>>;
}

/// Speaker diarization backend contract.
#[async_trait]
pub trait Diarizer: Send + Sync {
    /// Partition 16 kHz mono samples into speaker-labeled intervals.
    async fn diarize(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<SpeakerInterval>>;
}

/// The end-to-end pipeline over the four model collaborators.
///
/// Constructed once at startup; handlers only take shared references.
pub struct ConversationPipeline {
    transcriber: Arc<dyn Transcriber>,
    diarizer: Arc<dyn Diarizer>,
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn SentenceEmbedder>,
    config: PipelineConfig,
    language: Option<String>,
}

impl ConversationPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        diarizer: Arc<dyn Diarizer>,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn SentenceEmbedder>,
        config: PipelineConfig,
        language: Option<String>,
    ) -> Self {
        Self {
            transcriber,
            diarizer,
            llm,
            embedder,
            config,
            language,
        }
    }

    /// Transcribe an uploaded file and tag each segment with its speaker.
    pub async fn transcribe_file(&self, path: &Path) -> Result<Vec<SpokenSegment>, AppError> {
        let (samples, sample_rate) =
            decode_audio_file(path).map_err(|e| AppError::MalformedAudio(e.to_string()))?;

        let segments = self
            .transcriber
            .transcribe(&samples, self.language.as_deref())
            .await
            .map_err(|e| AppError::Internal(format!("Transcription failed: {}", e)))?;
        if segments.is_empty() {
            return Err(AppError::EmptyTranscript);
        }

        let intervals = self
            .diarizer
            .diarize(&samples, sample_rate)
            .await
            .map_err(|e| AppError::Internal(format!("Diarization failed: {}", e)))?;

        info!(
            "Pipeline: {} transcript segments, {} diarization intervals",
            segments.len(),
            intervals.len()
        );

        Ok(speakers::assign_speakers(
            &segments,
            &intervals,
            self.config.speaker_tolerance,
        ))
    }

    /// Run the full upload -> attribution pipeline.
    pub async fn process_file(&self, path: &Path) -> Result<Vec<AttributionRecord>, AppError> {
        let spoken = self.transcribe_file(path).await?;
        let turns = speakers::merge_turns(&spoken);

        let summary_text = self.summarize(&turns).await?;
        info!("Pipeline: summary of {} chars generated", summary_text.len());

        let records = attribution::attribute_summary(
            self.embedder.as_ref(),
            &turns,
            &summary_text,
            self.config.attribution_top_n,
            self.config.attribution_threshold,
        )
        .await?;

        Ok(records)
    }

    /// Summarize merged turns with the configured text-generation model.
    pub async fn summarize(&self, turns: &[MergedTurn]) -> Result<String, AppError> {
        let prompt = summary::build_summary_prompt(turns);
        let request = CompletionRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: Some(self.config.max_generated_tokens),
            temperature: None,
        };
        let response = self.llm.complete(request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixed-output adapters for handler and pipeline tests.

    use super::*;
    use crate::llm_engine::provider::{CompletionResponse, LlmError};

    pub struct FixedTranscriber(pub Vec<TranscriptSegment>);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(
            &self,
            _samples: &[f32],
            _language: Option<&str>,
        ) -> Result<Vec<TranscriptSegment>> {
            Ok(self.0.clone())
        }
    }

    pub struct FixedDiarizer(pub Vec<SpeakerInterval>);

    #[async_trait]
    impl Diarizer for FixedDiarizer {
        async fn diarize(
            &self,
            _samples: &[f32],
            _sample_rate: u32,
        ) -> Result<Vec<SpeakerInterval>> {
            Ok(self.0.clone())
        }
    }

    /// Echoes the last user message back, prefixed, so tests can assert the
    /// prompt made it through.
    pub struct EchoLlm;

    #[async_trait]
    impl LlmProvider for EchoLlm {
        fn provider_name(&self) -> &'static str {
            "echo"
        }

        async fn is_ready(&self) -> bool {
            true
        }

        async fn initialize(&self, _model_id: &str) -> Result<(), LlmError> {
            Ok(())
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let content = request
                .messages
                .last()
                .map(|m| format!("echo: {}", m.content))
                .unwrap_or_default();
            Ok(CompletionResponse {
                content,
                model: "echo".to_string(),
                prompt_tokens: None,
                completion_tokens: None,
                finish_reason: Some("stop".to_string()),
            })
        }
    }
}
