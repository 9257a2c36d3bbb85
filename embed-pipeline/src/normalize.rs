use std::path::Path;

use tokenizers::Tokenizer;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::NormalizerOptions;
use crate::error::{PipelineError, Result};

/// Sub-word segmentation model: maps a string to its ordered piece sequence.
///
/// This is the capability the embedding model exposes for text preparation;
/// the pipeline stays agnostic to how pieces are produced.
pub trait Segmenter: Send + Sync {
    /// Split `text` into ordered sub-word pieces. An empty input yields an
    /// empty piece sequence, not an error.
    fn pieces(&self, text: &str) -> Result<Vec<String>>;
}

/// Segmenter backed by a HuggingFace tokenizer definition (`tokenizer.json`).
pub struct WordPieceSegmenter {
    tokenizer: Tokenizer,
}

impl WordPieceSegmenter {
    /// Load a tokenizer definition from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            PipelineError::normalization(format!(
                "failed to load tokenizer {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { tokenizer })
    }
}

impl Segmenter for WordPieceSegmenter {
    fn pieces(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| PipelineError::normalization(format!("segmentation failed: {}", e)))?;
        Ok(encoding.get_tokens().to_vec())
    }
}

/// Identity segmenter: pieces are the whitespace-separated chunks of the
/// input. Used for models whose training data was pre-segmented, and in
/// tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn pieces(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

/// Maps one raw input line to its normalized piece string.
///
/// Applies, in order: optional word tokenization, optional case folding, and
/// unconditional sub-word segmentation. Pure and deterministic; each line is
/// normalized independently of every other line.
pub struct TextNormalizer {
    options: NormalizerOptions,
    segmenter: Box<dyn Segmenter>,
}

impl TextNormalizer {
    /// Create a normalizer with the model's options and segmentation model
    pub fn new(options: NormalizerOptions, segmenter: Box<dyn Segmenter>) -> Self {
        Self { options, segmenter }
    }

    /// Normalize one line into a whitespace-joined sub-word piece string.
    ///
    /// Empty lines come back as the empty string; they still flow through
    /// the encoder so every input line keeps its output row.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let mut text = text.to_string();
        if self.options.tokenize {
            text = word_tokenize(&text);
        }
        if self.options.lower_case {
            text = text.to_lowercase();
        }
        let pieces = self.segmenter.pieces(&text)?;
        Ok(pieces.join(" "))
    }
}

/// Unicode-aware word tokenization.
///
/// Splits on word boundaries so punctuation becomes its own token, and
/// rejoins with single spaces. Nothing is escaped; the text stays plain.
fn word_tokenize(text: &str) -> String {
    text.split_word_bounds()
        .filter(|seg| !seg.chars().all(char::is_whitespace))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(tokenize: bool, lower_case: bool) -> TextNormalizer {
        TextNormalizer::new(
            NormalizerOptions {
                tokenize,
                lower_case,
            },
            Box::new(WhitespaceSegmenter),
        )
    }

    #[test]
    fn test_word_tokenize_separates_punctuation() {
        assert_eq!(word_tokenize("Hello world."), "Hello world .");
        assert_eq!(word_tokenize("don't stop"), "don't stop");
        assert_eq!(word_tokenize("a,b"), "a , b");
    }

    #[test]
    fn test_normalize_applies_steps_in_order() {
        let n = normalizer(true, true);
        assert_eq!(n.normalize("Hello world.").unwrap(), "hello world .");
    }

    #[test]
    fn test_normalize_without_tokenize() {
        let n = normalizer(false, true);
        assert_eq!(n.normalize("Hello world.").unwrap(), "hello world.");
    }

    #[test]
    fn test_normalize_without_lower_case() {
        let n = normalizer(true, false);
        assert_eq!(n.normalize("Hello world.").unwrap(), "Hello world .");
    }

    #[test]
    fn test_empty_line_normalizes_to_empty_string() {
        let n = normalizer(true, true);
        assert_eq!(n.normalize("").unwrap(), "");
    }

    #[test]
    fn test_whitespace_only_line_normalizes_to_empty_string() {
        let n = normalizer(true, true);
        assert_eq!(n.normalize("   \t ").unwrap(), "");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let n = normalizer(true, true);
        let a = n.normalize("Quick, brown fox!").unwrap();
        let b = n.normalize("Quick, brown fox!").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_whitespace_segmenter_pieces() {
        let s = WhitespaceSegmenter;
        assert_eq!(s.pieces("a b  c").unwrap(), vec!["a", "b", "c"]);
        assert!(s.pieces("").unwrap().is_empty());
    }
}
