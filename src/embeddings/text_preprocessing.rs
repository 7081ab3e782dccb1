//! Text preprocessing utilities for embedding generation
//!
//! Cleans and bounds text before it reaches an embedding backend so that
//! the same question typed with different spacing embeds identically.

use tracing::debug;
use tracing::warn;

use crate::errors::AgriSenseError;

/// Preprocess text for embedding generation
///
/// This function handles:
/// - Normalizing whitespace and newlines
/// - Replacing control characters
/// - Cutting overly long text at a word boundary
pub fn preprocess_text_for_embedding(
    text: &str,
    max_chars: usize,
) -> Result<String, AgriSenseError> {
    let sanitized = normalize_whitespace(&sanitize_text(text));

    if sanitized.is_empty() {
        return Err(AgriSenseError::EmbeddingError(
            "Text is empty after preprocessing".to_string(),
        ));
    }

    if sanitized.chars().count() > max_chars {
        warn!(
            "Text too long ({} chars), truncating to {}",
            sanitized.chars().count(),
            max_chars
        );
        return Ok(truncate_at_word_boundary(&sanitized, max_chars));
    }

    debug!("Preprocessed text: {} -> {} chars", text.len(), sanitized.len());
    Ok(sanitized)
}

/// Collapse every run of whitespace (newlines, tabs, repeated spaces) into one space
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Replace control characters with spaces; all other Unicode is kept
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Keep at most `max_chars` characters, backing up to the last space if one exists
fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    match head.rfind(' ') {
        Some(pos) if pos > 0 => head[..pos].to_string(),
        _ => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_variants_normalize_identically() {
        let a = preprocess_text_for_embedding("What crops\n should I\tgrow?", 100).unwrap();
        let b = preprocess_text_for_embedding("  What crops should   I grow?  ", 100).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "What crops should I grow?");
    }

    #[test]
    fn test_non_ascii_text_is_preserved() {
        let text = "कपास में कीट नियंत्रण कैसे करें?";
        assert_eq!(preprocess_text_for_embedding(text, 100).unwrap(), text);
    }

    #[test]
    fn test_empty_and_blank_rejected() {
        assert!(preprocess_text_for_embedding("", 100).is_err());
        assert!(preprocess_text_for_embedding(" \n\t\r ", 100).is_err());
    }

    #[test]
    fn test_long_text_cut_at_word_boundary() {
        let result = preprocess_text_for_embedding("alpha beta gamma delta", 12).unwrap();
        assert_eq!(result, "alpha beta");
    }

    #[test]
    fn test_single_long_word_cut_hard() {
        let result = preprocess_text_for_embedding("abcdefghij", 4).unwrap();
        assert_eq!(result, "abcd");
    }
}
