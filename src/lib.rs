// Conv-Insight - conversation analysis backend
//
// Chains pretrained models behind a small HTTP API:
// - Whisper transcription (whisper-rs)
// - Speaker diarization (pyannote-rs)
// - Summarization and sentence embeddings (Ollama)
//
// The repository's own code is orchestration: persist an upload, run the
// models in sequence, merge their outputs and return JSON.

pub mod audio;
pub mod config;
pub mod diarization;
pub mod embedding;
pub mod error;
pub mod llm_engine;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod whisper_engine;
