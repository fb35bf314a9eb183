/*!
 * Natural-language heuristic.
 *
 * Decides whether a matched value reads like text a person would want
 * translated, or like a number, an internal identifier or a field reference.
 * Every check is configurable and reported through [`TextClass`] so the
 * decision for any string can be inspected directly.
 */

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration of the natural-language heuristic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextFilterConfig {
    /// Minimum number of alphabetic characters
    #[serde(default = "default_min_letters")]
    pub min_letters: usize,

    /// Reject single tokens that look like internal identifiers
    #[serde(default = "default_true")]
    pub skip_identifiers: bool,

    /// Additional regular expressions; a match rejects the text
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

impl Default for TextFilterConfig {
    fn default() -> Self {
        Self {
            min_letters: default_min_letters(),
            skip_identifiers: true,
            skip_patterns: Vec::new(),
        }
    }
}

fn default_min_letters() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Outcome of classifying a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextClass {
    /// Reads like natural language
    NaturalLanguage,
    /// Empty or whitespace only
    Empty,
    /// Fewer alphabetic characters than required (numbers, dates, symbols)
    TooFewLetters,
    /// Looks like an identifier or a field reference
    Identifier,
    /// Matched the configured skip pattern with this index
    SkipPattern(usize),
}

/// Compiled natural-language heuristic
#[derive(Debug, Clone)]
pub struct TextFilter {
    min_letters: usize,
    skip_identifiers: bool,
    skip_patterns: Vec<Regex>,
}

impl Default for TextFilter {
    fn default() -> Self {
        Self {
            min_letters: default_min_letters(),
            skip_identifiers: true,
            skip_patterns: Vec::new(),
        }
    }
}

impl TextFilter {
    /// Compile the heuristic from its configuration
    pub fn from_config(config: &TextFilterConfig) -> Result<Self, regex::Error> {
        let skip_patterns = config
            .skip_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            min_letters: config.min_letters,
            skip_identifiers: config.skip_identifiers,
            skip_patterns,
        })
    }

    /// Classify a text
    pub fn classify(&self, text: &str) -> TextClass {
        let text = text.trim();
        if text.is_empty() {
            return TextClass::Empty;
        }

        let letters = text.chars().filter(|c| c.is_alphabetic()).count();
        if letters < self.min_letters.max(1) {
            return TextClass::TooFewLetters;
        }

        if self.skip_identifiers && is_identifier_like(text) {
            return TextClass::Identifier;
        }

        if let Some(index) = self.skip_patterns.iter().position(|re| re.is_match(text)) {
            return TextClass::SkipPattern(index);
        }

        TextClass::NaturalLanguage
    }

    /// Whether the text should be translated
    pub fn is_natural_language(&self, text: &str) -> bool {
        self.classify(text) == TextClass::NaturalLanguage
    }
}

/// Identifier-like: a bracketed field reference such as `[Order Date]`, or a
/// single whitespace-free token that starts with `.` or contains `_` or `:`
/// (`Calculation_1234`, `sum:Sales:qk`, `.hidden`).
fn is_identifier_like(text: &str) -> bool {
    if text.starts_with('[') && text.ends_with(']') {
        return true;
    }
    if text.contains(char::is_whitespace) {
        return false;
    }
    text.starts_with('.') || text.contains(['_', ':'])
}
