//! Query/document tokenizer.
//!
//! Lowercases, turns every character that is neither a word character (alphanumeric or `_`)
//! nor whitespace into a space, splits on whitespace and drops tokens of two characters or
//! fewer. No stop words, no stemming.
//!
//! The same function is used at fit time and at query time, so it must stay pure.

/// Tokens must be strictly longer than this many characters to be kept.
pub const MIN_TOKEN_CHARS: usize = 2;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize `text` into index terms.
///
/// Token length is counted in Unicode scalar values, not bytes.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if is_word_char(c) || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_owned)
        .collect()
}

/// Tokenize any displayable value by first rendering it to text.
pub fn tokenize_value<T: std::fmt::Display + ?Sized>(value: &T) -> Vec<String> {
    tokenize(&value.to_string())
}
