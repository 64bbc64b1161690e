// Prompt construction and summary post-processing

use super::types::MergedTurn;

/// Instruction prepended to the formatted transcript before summarization.
pub const SUMMARY_INSTRUCTION: &str =
    "Consider a conversation between two people and give single paragraph summary.";

/// Format merged turns as numbered lines under the fixed instruction.
///
/// Output shape:
/// ```text
/// Consider a conversation between two people and give single paragraph summary.
/// 1 ) first turn text
/// 2 ) second turn text
/// ```
pub fn build_summary_prompt(turns: &[MergedTurn]) -> String {
    let mut prompt = String::with_capacity(
        SUMMARY_INSTRUCTION.len() + turns.iter().map(|t| t.text.len() + 8).sum::<usize>(),
    );
    prompt.push_str(SUMMARY_INSTRUCTION);
    prompt.push('\n');
    for turn in turns {
        prompt.push_str(&format!("{} ) {}\n", turn.id, turn.text));
    }
    prompt
}

/// Split a generated summary into sentences.
///
/// Chat models often open with a preamble paragraph ("Here's a summary of
/// the conversation:"); when a paragraph break is present, everything before
/// the first one is discarded. Sentences are split on the fixed ". "
/// delimiter; empty entries are dropped.
pub fn split_summary_sentences(summary: &str) -> Vec<String> {
    let body = match summary.split_once("\n\n") {
        Some((_preamble, rest)) => rest,
        None => summary,
    };

    body.split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(id: u32, text: &str) -> MergedTurn {
        MergedTurn {
            id,
            speaker: format!("Speaker {}", id),
            text: text.to_string(),
            start: 0.0,
            end: 1.0,
        }
    }

    #[test]
    fn test_prompt_format() {
        let turns = vec![turn(1, "hi there"), turn(2, "hello")];
        let prompt = build_summary_prompt(&turns);
        assert_eq!(
            prompt,
            format!("{}\n1 ) hi there\n2 ) hello\n", SUMMARY_INSTRUCTION)
        );
    }

    #[test]
    fn test_prompt_with_no_turns_is_just_the_instruction() {
        let prompt = build_summary_prompt(&[]);
        assert_eq!(prompt, format!("{}\n", SUMMARY_INSTRUCTION));
    }

    #[test]
    fn test_split_discards_preamble_paragraph() {
        let summary = "Here's a summary of the conversation:\n\nThey met. They talked. They left.";
        let sentences = split_summary_sentences(summary);
        assert_eq!(sentences, vec!["They met", "They talked", "They left."]);
    }

    #[test]
    fn test_split_without_preamble_uses_whole_summary() {
        let sentences = split_summary_sentences("One thing happened. Then another.");
        assert_eq!(sentences, vec!["One thing happened", "Then another."]);
    }

    #[test]
    fn test_split_drops_empty_sentences() {
        let sentences = split_summary_sentences(".  . Actual content.");
        assert_eq!(sentences, vec!["Actual content."]);
    }
}
