//! Language utilities for target language handling
//!
//! The target language can be given as an English name ("French") or as an
//! ISO 639-1 / ISO 639-2 code ("fr", "fra", "fre"). Providers get the English
//! name; output file names get the upper-cased two-letter code.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // If it's a 2-letter code, convert to 3-letter
    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    }
    // If it's already a 3-letter code, ensure it's ISO 639-2/T
    else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        if let Some((_, part2t)) = PART2B_TO_PART2T.iter().find(|(b, _)| *b == normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Resolve a language given by code or English name
pub fn resolve_language(input: &str) -> Result<Language> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Language must not be empty"));
    }

    if let Ok(part2t) = normalize_to_part2t(trimmed) {
        if let Some(lang) = Language::from_639_3(&part2t) {
            return Ok(lang);
        }
    }

    Language::from_name(&title_case(trimmed))
        .ok_or_else(|| anyhow!("Unknown language: {}", input))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// English name to hand to a provider.
///
/// Codes and known names resolve to the ISO English name; anything else
/// ("Brazilian Portuguese") is passed through as written.
pub fn display_name(input: &str) -> String {
    match resolve_language(input) {
        Ok(lang) => lang.to_name().to_string(),
        Err(_) => input.trim().to_string(),
    }
}

/// File-name codes that follow the country rather than the language
const FILE_CODE_OVERRIDES: [(&str, &str); 4] = [("ja", "JP"), ("ko", "KR"), ("sv", "SE"), ("da", "DK")];

/// Code used in output file names: the upper-cased ISO 639-1 code (with the
/// country-style exceptions above), or the first two letters of the input
/// when the language has none
pub fn file_code(input: &str) -> String {
    if let Some(code) = resolve_language(input).ok().and_then(|lang| lang.to_639_1()) {
        return FILE_CODE_OVERRIDES
            .iter()
            .find(|(iso, _)| *iso == code)
            .map(|(_, file)| file.to_string())
            .unwrap_or_else(|| code.to_uppercase());
    }

    input
        .trim()
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
