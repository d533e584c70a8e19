use super::{Analyzer, Token};
use rustc_hash::FxHashSet;

/// Maximum token length to keep.
/// Longer runs are likely extraction noise (hex dumps, concatenated glyphs).
const MAX_TOKEN_LENGTH: usize = 128;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
    "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Splits text into lowercase alphanumeric words
///
/// Every word gets the next 1-based position before stop words are removed, so
/// positions keep the gaps left by dropped words.
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    stop_words: FxHashSet<&'static str>,
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::english()
    }
}

impl StandardAnalyzer {
    /// Analyzer dropping common English stop words
    pub fn english() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Analyzer keeping every word
    pub fn without_stop_words() -> Self {
        Self {
            stop_words: FxHashSet::default(),
        }
    }

    fn push_word(&self, tokens: &mut Vec<Token>, word: &str, position: u32, start: usize) {
        if word.len() > MAX_TOKEN_LENGTH {
            return;
        }
        let term = word.to_lowercase();
        if self.stop_words.contains(term.as_str()) {
            return;
        }
        tokens.push(Token {
            term,
            position,
            start: start as u32,
            end: (start + word.len()) as u32,
        });
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;
        let mut word_start: Option<usize> = None;

        for (i, ch) in text.char_indices() {
            if ch.is_alphanumeric() {
                if word_start.is_none() {
                    word_start = Some(i);
                }
            } else if let Some(start) = word_start.take() {
                position += 1;
                self.push_word(&mut tokens, &text[start..i], position, start);
            }
        }

        // Handle last word
        if let Some(start) = word_start {
            position += 1;
            self.push_word(&mut tokens, &text[start..], position, start);
        }

        tokens
    }
}
