// Whisper Engine - text cleaning and repetition removal
//
// Whisper hallucinates on silence and noisy audio: stock phrases, stuck
// words, looping phrases. These passes drop or compact that output before
// it reaches the pipeline.

use std::collections::HashSet;

/// Clean repetitive text patterns and meaningless outputs.
/// Returns an empty string when the whole segment should be discarded.
pub fn clean_repetitive_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    if is_meaningless_output(text) {
        log::debug!("Detected meaningless output, returning empty: '{}'", text);
        return String::new();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return text.to_string();
    }

    let cleaned_words = remove_word_repetitions(&words);
    let cleaned_words = remove_phrase_repetitions(&cleaned_words);

    cleaned_words.join(" ")
}

/// Check for stock hallucination phrases and degenerate character output.
pub fn is_meaningless_output(text: &str) -> bool {
    let text_lower = text.to_lowercase();

    let meaningless_patterns = [
        "thank you for watching",
        "thanks for watching",
        "like and subscribe",
        "[music]",
        "[applause]",
        "[laughter]",
    ];

    if meaningless_patterns.iter().any(|p| text_lower.contains(p)) {
        return true;
    }

    // Mostly one or two characters repeated over and over
    let unique_chars: HashSet<char> = text.chars().collect();
    unique_chars.len() <= 3 && text.len() > 10
}

/// Collapse consecutive repetitions of the same word into one instance.
fn remove_word_repetitions<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut cleaned = Vec::with_capacity(words.len());
    for &word in words {
        if cleaned.last() != Some(&word) {
            cleaned.push(word);
        }
    }
    cleaned
}

/// Collapse immediately repeated phrases of 2..=5 words into one instance.
fn remove_phrase_repetitions<'a>(words: &[&'a str]) -> Vec<&'a str> {
    if words.len() < 4 {
        return words.to_vec();
    }

    let mut result = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        let mut skipped = false;

        for phrase_len in (2..=5).rev() {
            if i + phrase_len * 2 <= words.len()
                && words[i..i + phrase_len] == words[i + phrase_len..i + phrase_len * 2]
            {
                result.extend_from_slice(&words[i..i + phrase_len]);
                i += phrase_len * 2;
                skipped = true;
                break;
            }
        }

        if !skipped {
            result.push(words[i]);
            i += 1;
        }
    }

    result
}
