// Summary-to-transcript attribution
//
// Embeds every merged turn once per request, then ranks turns against each
// summary sentence by cosine similarity. Vector i always corresponds to
// turn i, so there is no index bookkeeping beyond the ranking itself.

use log::debug;

use crate::embedding::{cosine_similarity, EmbeddingError, SentenceEmbedder};

use super::summary::split_summary_sentences;
use super::types::{AttributionRecord, MergedTurn};

/// Map each summary sentence to the turns most similar to it.
///
/// Keeps at most `top_n` turns per sentence, and only those whose cosine
/// similarity meets `threshold`; a sentence may attribute to zero turns.
pub async fn attribute_summary(
    embedder: &dyn SentenceEmbedder,
    turns: &[MergedTurn],
    summary: &str,
    top_n: usize,
    threshold: f32,
) -> Result<Vec<AttributionRecord>, EmbeddingError> {
    let sentences = split_summary_sentences(summary);
    if sentences.is_empty() || turns.is_empty() {
        return Ok(Vec::new());
    }

    let turn_texts: Vec<String> = turns.iter().map(|t| t.text.clone()).collect();
    let turn_vectors = embedder.embed_batch(&turn_texts).await?;

    let mut records = Vec::with_capacity(sentences.len());
    for sentence in sentences {
        let sentence_vector = embedder.embed(&sentence).await?;

        let mut ranked: Vec<(usize, f32)> = Vec::with_capacity(turn_vectors.len());
        for (idx, vector) in turn_vectors.iter().enumerate() {
            let similarity = cosine_similarity(&sentence_vector, vector)?;
            ranked.push((idx, similarity));
        }
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let sentence_data: Vec<MergedTurn> = ranked
            .into_iter()
            .take(top_n)
            .filter(|(_, similarity)| *similarity >= threshold)
            .map(|(idx, _)| turns[idx].clone())
            .collect();

        debug!(
            "Attributed {} turn(s) to sentence '{}'",
            sentence_data.len(),
            sentence
        );

        records.push(AttributionRecord {
            summary_sentence: sentence,
            sentence_data,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbedder;

    fn turn(id: u32, text: &str) -> MergedTurn {
        MergedTurn {
            id,
            speaker: format!("Speaker {}", (id % 2) + 1),
            text: text.to_string(),
            start: id as f64,
            end: id as f64 + 1.0,
        }
    }

    #[tokio::test]
    async fn test_exact_match_ranks_first() {
        let turns = vec![
            turn(1, "we discussed the quarterly budget"),
            turn(2, "lunch plans for friday"),
            turn(3, "the new hire starts monday"),
        ];
        let summary = "lunch plans for friday. the new hire starts monday.";

        let records = attribute_summary(&MockEmbedder, &turns, summary, 3, 0.0)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        // The sentence identical to a turn's text must rank that turn first.
        assert_eq!(records[0].sentence_data[0].id, 2);
    }

    #[tokio::test]
    async fn test_top_n_caps_attributions() {
        let turns = vec![turn(1, "alpha"), turn(2, "beta"), turn(3, "gamma")];
        let records = attribute_summary(&MockEmbedder, &turns, "alpha.", 2, 0.0)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].sentence_data.len() <= 2);
    }

    #[tokio::test]
    async fn test_ranking_is_deterministic() {
        let turns = vec![turn(1, "first topic"), turn(2, "second topic")];
        let summary = "They talked about the first topic. Then the second.";

        let first = attribute_summary(&MockEmbedder, &turns, summary, 3, 0.0)
            .await
            .unwrap();
        let second = attribute_summary(&MockEmbedder, &turns, summary, 3, 0.0)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_turns_produce_no_records() {
        let records = attribute_summary(&MockEmbedder, &[], "A summary.", 3, 0.5)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_can_filter_everything() {
        let turns = vec![turn(1, "completely unrelated words here")];
        // Cosine similarity never exceeds 1.0, so a threshold above it
        // filters every candidate.
        let records = attribute_summary(&MockEmbedder, &turns, "zzz.", 3, 1.1)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].sentence_data.is_empty());
    }
}
