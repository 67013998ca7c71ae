//! Word classification.
//!
//! A [`WordClassifier`] splits characters into three classes (whitespace, configured non-word
//! characters, and everything else) and composes the boundary pattern used by the word motions.
//! The pattern tries, in order:
//!
//! 1. a blank line (`^[\t ]*$`), so an empty line or one holding only spaces and tabs is one unit,
//! 2. a run of word characters,
//! 3. a run of non-word characters (only when requested and the set is non-empty).

use crate::error::CursorError;
use regex::{Regex, RegexBuilder};

/// Character class used by the word motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Any Unicode whitespace.
    Whitespace,
    /// One of the configured non-word characters.
    NonWord,
    /// Everything else.
    Word,
}

/// Builds word predicates and boundary patterns from a set of non-word characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordClassifier {
    non_word_characters: String,
}

impl WordClassifier {
    /// Create a classifier for the given non-word character set.
    pub fn new(non_word_characters: &str) -> Self {
        Self {
            non_word_characters: non_word_characters.to_string(),
        }
    }

    /// Classify a single character. Whitespace wins over the configured set.
    pub fn classify(&self, ch: char) -> CharClass {
        if ch.is_whitespace() {
            CharClass::Whitespace
        } else if self.non_word_characters.contains(ch) {
            CharClass::NonWord
        } else {
            CharClass::Word
        }
    }

    /// The boundary pattern source.
    pub fn pattern(&self, include_non_word_characters: bool) -> String {
        let escaped = self.escaped_class_members();
        let mut segments = vec![r"^[\t ]*$".to_string(), format!(r"[^\s{escaped}]+")];
        if include_non_word_characters && !escaped.is_empty() {
            segments.push(format!("[{escaped}]+"));
        }
        segments.join("|")
    }

    /// Compile the boundary pattern. `^` and `$` match at line boundaries.
    pub fn regex(&self, include_non_word_characters: bool) -> Result<Regex, CursorError> {
        let regex = RegexBuilder::new(&self.pattern(include_non_word_characters))
            .multi_line(true)
            .build()?;
        Ok(regex)
    }

    fn escaped_class_members(&self) -> String {
        let mut out = String::with_capacity(self.non_word_characters.len() * 2);
        let mut seen = Vec::new();
        for ch in self.non_word_characters.chars() {
            if seen.contains(&ch) {
                continue;
            }
            seen.push(ch);
            out.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4])));
        }
        out
    }
}
