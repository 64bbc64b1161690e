// Speaker assignment and turn merging
//
// Both passes are pure list processing. Assignment scans diarization
// intervals in order and takes the first window hit; merging folds
// consecutive same-speaker segments left to right. Output order always
// equals input order.

use super::types::{MergedTurn, SpeakerInterval, SpokenSegment, TranscriptSegment};

/// Label used when no diarization interval overlaps a segment.
pub const UNKNOWN_SPEAKER: &str = "Unknown Speaker";

/// Find the speaker for one transcript segment.
///
/// Returns the speaker of the first interval whose
/// [start - tolerance, end + tolerance] window contains either endpoint of
/// the segment. First-match order is the contract, not an accident.
pub fn find_closest_speaker(
    segment: &TranscriptSegment,
    intervals: &[SpeakerInterval],
    tolerance: f64,
) -> String {
    for interval in intervals {
        let lo = interval.start - tolerance;
        let hi = interval.end + tolerance;
        if (lo <= segment.start && segment.start <= hi)
            || (lo <= segment.end && segment.end <= hi)
        {
            return interval.speaker.clone();
        }
    }
    UNKNOWN_SPEAKER.to_string()
}

/// Tag every transcript segment with a speaker label.
pub fn assign_speakers(
    segments: &[TranscriptSegment],
    intervals: &[SpeakerInterval],
    tolerance: f64,
) -> Vec<SpokenSegment> {
    segments
        .iter()
        .map(|segment| SpokenSegment {
            speaker: find_closest_speaker(segment, intervals, tolerance),
            text: segment.text.clone(),
            start: segment.start,
            end: segment.end,
        })
        .collect()
}

/// Fold consecutive same-speaker segments into merged turns.
///
/// A segment with the same speaker as the previous turn appends its text
/// (space-joined) and extends the turn's end time; otherwise a new turn
/// starts with the next sequential id. Ids run 1..=K with no gaps.
pub fn merge_turns(segments: &[SpokenSegment]) -> Vec<MergedTurn> {
    let mut merged: Vec<MergedTurn> = Vec::new();

    for segment in segments {
        if let Some(last) = merged.last_mut() {
            if last.speaker == segment.speaker {
                last.text.push(' ');
                last.text.push_str(&segment.text);
                last.end = segment.end;
                continue;
            }
        }
        merged.push(MergedTurn {
            id: merged.len() as u32 + 1,
            speaker: segment.speaker.clone(),
            text: segment.text.clone(),
            start: segment.start,
            end: segment.end,
        });
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    fn interval(start: f64, end: f64, speaker: &str) -> SpeakerInterval {
        SpeakerInterval {
            start,
            end,
            speaker: speaker.to_string(),
        }
    }

    fn spoken(speaker: &str, text: &str, start: f64, end: f64) -> SpokenSegment {
        SpokenSegment {
            speaker: speaker.to_string(),
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_first_overlapping_interval_wins() {
        let intervals = vec![
            interval(0.0, 4.0, "Speaker 1"),
            interval(3.0, 8.0, "Speaker 2"),
        ];
        // Both intervals cover t=3.5; the scan order decides.
        let speaker = find_closest_speaker(&segment(3.5, 3.9, "hi"), &intervals, 0.2);
        assert_eq!(speaker, "Speaker 1");
    }

    #[test]
    fn test_tolerance_window_catches_near_miss() {
        let intervals = vec![interval(1.0, 2.0, "Speaker 1")];
        // Segment starts 0.15s after the interval ends, inside the 0.2s window.
        let speaker = find_closest_speaker(&segment(2.15, 3.0, "hi"), &intervals, 0.2);
        assert_eq!(speaker, "Speaker 1");
        // And outside it.
        let speaker = find_closest_speaker(&segment(2.25, 3.0, "hi"), &intervals, 0.2);
        assert_eq!(speaker, UNKNOWN_SPEAKER);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let segments = vec![segment(0.0, 1.0, "a"), segment(1.0, 2.0, "b")];
        let intervals = vec![interval(0.0, 1.5, "Speaker 1"), interval(1.5, 2.0, "Speaker 2")];
        let first = assign_speakers(&segments, &intervals, 0.2);
        let second = assign_speakers(&segments, &intervals, 0.2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_same_speaker_pair() {
        let segments = vec![spoken("A", "hi", 0.0, 5.0), spoken("A", "there", 5.0, 9.0)];
        let merged = merge_turns(&segments);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[0].text, "hi there");
        assert_eq!(merged[0].start, 0.0);
        assert_eq!(merged[0].end, 9.0);
    }

    #[test]
    fn test_merge_preserves_text_and_ids_have_no_gaps() {
        let segments = vec![
            spoken("A", "one", 0.0, 1.0),
            spoken("A", "two", 1.0, 2.0),
            spoken("B", "three", 2.0, 3.0),
            spoken("A", "four", 3.0, 4.0),
            spoken("A", "five", 4.0, 5.0),
        ];
        let merged = merge_turns(&segments);

        assert_eq!(merged.len(), 3);
        for (i, turn) in merged.iter().enumerate() {
            assert_eq!(turn.id, i as u32 + 1);
        }

        let total: Vec<String> = merged.iter().map(|t| t.text.clone()).collect();
        assert_eq!(total.join(" "), "one two three four five");
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_turns(&[]).is_empty());
    }
}
