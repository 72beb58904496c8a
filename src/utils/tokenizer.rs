use crate::index::types::{Position, SearchConfig};

/// Characters removed from words when `ignore_punctuation` is set
pub const PUNCTUATION: &[char] = &['.', ',', '!', ':', ';', '?', '(', ')'];

/// A word and its zero-based position inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: String,
    pub position: Position,
}

/// Apply punctuation stripping and case folding to a single word.
///
/// Returns `None` when nothing is left of the word.
pub fn normalize_word(word: &str, config: &SearchConfig) -> Option<String> {
    let mut word = if config.ignore_punctuation {
        word.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
    } else {
        word.to_string()
    };

    if !config.case_sensitive {
        word = word.to_lowercase();
    }

    if word.is_empty() { None } else { Some(word) }
}

/// Split document text into positioned words.
///
/// Words are separated by any whitespace, across lines. Positions count only
/// the words that survive normalization.
pub fn tokenize(text: &str, config: &SearchConfig) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| normalize_word(raw, config))
        .enumerate()
        .map(|(i, word)| Token {
            word,
            position: i as Position,
        })
        .collect()
}

/// Words of `text` in order, without positions
pub fn tokenize_words(text: &str, config: &SearchConfig) -> Vec<String> {
    tokenize(text, config).into_iter().map(|t| t.word).collect()
}
