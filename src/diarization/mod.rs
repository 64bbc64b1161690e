// Diarization module
//
// engine.rs: pyannote-rs segmentation and speaker clustering

pub mod engine;

pub use engine::{DiarizationConfig, DiarizationEngine};
