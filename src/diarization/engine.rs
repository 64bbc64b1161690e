// Diarization engine using pyannote-rs
// Wraps segmentation and speaker embedding extraction

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};

use pyannote_rs::{get_segments, EmbeddingExtractor, EmbeddingManager};

use crate::pipeline::types::SpeakerInterval;
use crate::pipeline::Diarizer;

/// Configuration for diarization
#[derive(Debug, Clone)]
pub struct DiarizationConfig {
    /// Path to segmentation model (segmentation-3.0.onnx)
    pub segmentation_model_path: PathBuf,
    /// Path to speaker embedding model (wespeaker_en_voxceleb_CAM++.onnx)
    pub embedding_model_path: PathBuf,
    /// Maximum number of speakers to cluster per request
    pub max_speakers: usize,
    /// Similarity threshold for speaker matching (0.0 to 1.0)
    pub similarity_threshold: f32,
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            segmentation_model_path: PathBuf::new(),
            embedding_model_path: PathBuf::new(),
            max_speakers: 2,
            similarity_threshold: 0.5,
        }
    }
}

/// Diarization engine that labels speakers in audio.
///
/// The embedding model is loaded once; clustering state is created fresh for
/// every call, so speaker labels always start at "Speaker 1" per upload.
pub struct DiarizationEngine {
    config: DiarizationConfig,
    /// Shared ONNX session; pyannote-rs needs &mut for inference
    extractor: Mutex<EmbeddingExtractor>,
}

impl DiarizationEngine {
    pub fn new(config: DiarizationConfig) -> Result<Self> {
        info!("Initializing diarization engine");
        debug!("Segmentation model: {:?}", config.segmentation_model_path);
        debug!("Embedding model: {:?}", config.embedding_model_path);

        if !config.segmentation_model_path.exists() {
            return Err(anyhow!(
                "Segmentation model not found: {:?}",
                config.segmentation_model_path
            ));
        }
        if !config.embedding_model_path.exists() {
            return Err(anyhow!(
                "Embedding model not found: {:?}",
                config.embedding_model_path
            ));
        }

        // pyannote-rs uses eyre, convert to anyhow
        let extractor = EmbeddingExtractor::new(&config.embedding_model_path)
            .map_err(|e| anyhow!("Failed to create embedding extractor: {}", e))?;

        info!("Diarization engine initialized");

        Ok(Self {
            config,
            extractor: Mutex::new(extractor),
        })
    }

    /// Run diarization on one request's samples.
    ///
    /// Takes f32 samples and converts to i16 internally, which is what
    /// pyannote-rs consumes.
    pub fn diarize_samples(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<SpeakerInterval>> {
        info!(
            "Running diarization on {} samples at {} Hz",
            samples.len(),
            sample_rate
        );

        let samples_i16: Vec<i16> = samples
            .iter()
            .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
            .collect();

        let segments_iter = get_segments(
            &samples_i16,
            sample_rate,
            &self.config.segmentation_model_path,
        )
        .map_err(|e| anyhow!("Failed to run segmentation: {}", e))?;

        // Fresh clustering per request
        let mut manager = EmbeddingManager::new(self.config.max_speakers);
        let mut extractor = self
            .extractor
            .lock()
            .map_err(|_| anyhow!("Embedding extractor lock poisoned"))?;

        let mut intervals = Vec::new();

        for segment_result in segments_iter {
            let segment = match segment_result {
                Ok(seg) => seg,
                Err(e) => {
                    warn!("Failed to process segment: {}", e);
                    continue;
                }
            };

            let embedding: Vec<f32> = match extractor.compute(&segment.samples) {
                Ok(iter) => iter.collect(),
                Err(e) => {
                    warn!("Failed to compute embedding for segment: {}", e);
                    continue;
                }
            };

            let speaker = match manager.search_speaker(embedding, self.config.similarity_threshold)
            {
                Some(speaker_idx) => format!("Speaker {}", speaker_idx + 1),
                None => {
                    warn!(
                        "Max speakers ({}) reached, segment assigned to 'Unknown'",
                        self.config.max_speakers
                    );
                    "Unknown".to_string()
                }
            };

            intervals.push(SpeakerInterval {
                start: segment.start,
                end: segment.end,
                speaker,
            });
        }

        info!("Diarization complete: {} intervals", intervals.len());
        Ok(intervals)
    }
}

#[async_trait]
impl Diarizer for DiarizationEngine {
    async fn diarize(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<SpeakerInterval>> {
        self.diarize_samples(samples, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiarizationConfig::default();
        assert_eq!(config.max_speakers, 2);
        assert_eq!(config.similarity_threshold, 0.5);
    }

    #[test]
    fn test_missing_models_fail_initialization() {
        let config = DiarizationConfig {
            segmentation_model_path: PathBuf::from("/nonexistent/segmentation.onnx"),
            embedding_model_path: PathBuf::from("/nonexistent/embedding.onnx"),
            ..Default::default()
        };
        assert!(DiarizationEngine::new(config).is_err());
    }
}
