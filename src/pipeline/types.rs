// Data shapes flowing through the analysis pipeline
//
// All of these live for the duration of one request; there is no
// persistence layer.

use serde::{Deserialize, Serialize};

/// A timed chunk of recognized speech from the transcription adapter.
/// Ordered by start time and immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

/// A stretch of audio attributed to one speaker by the diarization adapter.
/// Intervals may be non-contiguous or overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerInterval {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

/// A transcript segment after speaker assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenSegment {
    pub speaker: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A maximal run of consecutive segments from one speaker.
/// Ids are sequential from 1 with no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTurn {
    pub id: u32,
    pub speaker: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// One summary sentence mapped back to the turns most similar to it,
/// ordered by descending similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRecord {
    pub summary_sentence: String,
    pub sentence_data: Vec<MergedTurn>,
}
