// Runtime configuration
//
// Everything is read from environment variables once at startup, with
// defaults that match a local development setup (models under ./models,
// Ollama on its default port).

use std::path::PathBuf;
use std::str::FromStr;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Tunables for the analysis pipeline itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seconds of slack when matching transcript segments to diarization intervals
    pub speaker_tolerance: f64,
    /// Maximum speakers the diarizer will cluster per request
    pub max_speakers: usize,
    /// Similarity threshold for speaker clustering (0.0 to 1.0)
    pub speaker_similarity_threshold: f32,
    /// Token budget for generated text (summary and /generate)
    pub max_generated_tokens: u32,
    /// Turns attributed per summary sentence
    pub attribution_top_n: usize,
    /// Minimum cosine similarity for an attribution to count
    pub attribution_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            speaker_tolerance: 0.2,
            max_speakers: 2,
            speaker_similarity_threshold: 0.5,
            max_generated_tokens: 256,
            attribution_top_n: 3,
            attribution_threshold: 0.5,
        }
    }
}

/// Process-wide configuration, read once in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Directory for uploaded scratch files
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
    /// Path to the Whisper GGML model file
    pub whisper_model_path: PathBuf,
    /// Path to the pyannote segmentation model (segmentation-3.0.onnx)
    pub segmentation_model_path: PathBuf,
    /// Path to the pyannote speaker embedding model
    pub embedding_model_path: PathBuf,
    /// Base URL of the Ollama server (chat + embeddings)
    pub ollama_base_url: String,
    /// Ollama model used for summarization and /generate
    pub llm_model: String,
    /// Ollama model used for sentence embeddings
    pub embedding_model: String,
    /// HTTP timeout for model calls, in seconds
    pub llm_timeout_secs: u64,
    /// Transcription language hint ("auto" disables the hint)
    pub language: Option<String>,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let language = match env_or("CONV_INSIGHT_LANGUAGE", "en").as_str() {
            "auto" => None,
            lang => Some(lang.to_string()),
        };

        Self {
            bind_addr: env_or("CONV_INSIGHT_BIND_ADDR", "127.0.0.1:5000"),
            upload_dir: PathBuf::from(env_or("CONV_INSIGHT_UPLOAD_DIR", "uploads")),
            max_upload_bytes: env_parse("CONV_INSIGHT_MAX_UPLOAD_BYTES", 256 * 1024 * 1024),
            whisper_model_path: PathBuf::from(env_or(
                "CONV_INSIGHT_WHISPER_MODEL",
                "models/ggml-base.bin",
            )),
            segmentation_model_path: PathBuf::from(env_or(
                "CONV_INSIGHT_SEGMENTATION_MODEL",
                "models/segmentation-3.0.onnx",
            )),
            embedding_model_path: PathBuf::from(env_or(
                "CONV_INSIGHT_SPEAKER_EMBEDDING_MODEL",
                "models/wespeaker_en_voxceleb_CAM++.onnx",
            )),
            ollama_base_url: env_or("CONV_INSIGHT_OLLAMA_URL", "http://localhost:11434"),
            llm_model: env_or("CONV_INSIGHT_LLM_MODEL", "llama3.2:1b"),
            embedding_model: env_or("CONV_INSIGHT_EMBEDDING_MODEL", "all-minilm"),
            llm_timeout_secs: env_parse("CONV_INSIGHT_LLM_TIMEOUT_SECS", 120),
            language,
            pipeline: PipelineConfig {
                speaker_tolerance: env_parse("CONV_INSIGHT_SPEAKER_TOLERANCE", 0.2),
                max_speakers: env_parse("CONV_INSIGHT_MAX_SPEAKERS", 2),
                speaker_similarity_threshold: env_parse("CONV_INSIGHT_SPEAKER_THRESHOLD", 0.5),
                max_generated_tokens: env_parse("CONV_INSIGHT_MAX_GENERATED_TOKENS", 256),
                attribution_top_n: env_parse("CONV_INSIGHT_ATTRIBUTION_TOP_N", 3),
                attribution_threshold: env_parse("CONV_INSIGHT_ATTRIBUTION_THRESHOLD", 0.5),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.speaker_tolerance, 0.2);
        assert_eq!(config.max_speakers, 2);
        assert_eq!(config.max_generated_tokens, 256);
        assert_eq!(config.attribution_top_n, 3);
    }
}
