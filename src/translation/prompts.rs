/*!
 * Prompt templates and response parsing for workbook translation.
 *
 * The model receives the batch as a numbered list and is asked to answer
 * with a JSON array of strings. Answers in the numbered-list form are
 * accepted too, since models fall back to it for short batches.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;
use crate::providers::TranslationRequest;

/// System prompt template for workbook translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for workbook translation.
    pub const WORKBOOK_TRANSLATOR: &'static str = r#"You are a professional translator for business intelligence dashboards. Translate every text you are given into {target_language}.

## Rules
- Keep place names, company names and brand names exactly as written
- Keep technical terminology and abbreviations that are used untranslated in {target_language} business reporting
- Keep numbers, units, currency symbols and placeholders such as <Sheet Name> unchanged
- Translate labels concisely; these are sheet names, captions and titles
- Never merge, split, drop or reorder items

## Output Requirements
- Answer with a JSON array of strings only, one translation per input item, in input order
- Do not include any text outside the JSON array"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default workbook translator template.
    pub fn workbook_translator() -> Self {
        Self::new(Self::WORKBOOK_TRANSLATOR)
    }

    /// Use `template` unless it is blank, in which case use the default.
    pub fn or_default(template: &str) -> Self {
        if template.trim().is_empty() {
            Self::default()
        } else {
            Self::new(template)
        }
    }

    /// Render the template with the given target language.
    pub fn render(&self, target_language: &str) -> String {
        self.template.replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::workbook_translator()
    }
}

/// Builds the user message for one batch.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder<'a> {
    request: &'a TranslationRequest,
}

impl<'a> TranslationPromptBuilder<'a> {
    /// Create a builder for the request.
    pub fn new(request: &'a TranslationRequest) -> Self {
        Self { request }
    }

    /// Render the user message.
    pub fn build(&self) -> String {
        let request = self.request;
        let mut prompt = format!(
            "Translate the following {} item(s) into {}.\n",
            request.texts.len(),
            request.target_language
        );

        if !request.preserve_terms.is_empty() {
            prompt.push_str("\nKeep these terms exactly as written, wherever they appear:\n");
            for term in &request.preserve_terms {
                prompt.push_str(&format!("- {}\n", term));
            }
        }

        prompt.push_str("\nItems:\n");
        for (i, text) in request.texts.iter().enumerate() {
            // Line breaks inside an item would break the numbering
            prompt.push_str(&format!("{}. {}\n", i + 1, text.replace('\n', " ")));
        }

        prompt.push_str(&format!(
            "\nAnswer with a JSON array of exactly {} string(s).",
            request.texts.len()
        ));
        prompt
    }
}

static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)[.)]\s*(.*)$").unwrap()
});

/// Extract the translations from a model answer.
///
/// Tries a JSON array first (the outermost `[` ... `]` of the answer, so code
/// fences and a leading sentence are tolerated), then a numbered list. A
/// single submitted text falls back to the whole answer. Quotes wrapping an
/// item are dropped unless the submitted text was quoted the same way. The
/// count is not checked here.
pub fn parse_response(answer: &str, texts: &[String]) -> Result<Vec<String>, ProviderError> {
    if let Some(items) = parse_json_array(answer) {
        return Ok(clean_items(items.iter().map(String::as_str), texts));
    }

    let numbered: Vec<&str> = answer
        .lines()
        .filter_map(|line| NUMBERED_LINE.captures(line))
        .filter_map(|captures| captures.get(2))
        .map(|item| item.as_str())
        .collect();
    if !numbered.is_empty() {
        return Ok(clean_items(numbered.into_iter(), texts));
    }

    let trimmed = answer.trim();
    if texts.len() == 1 && !trimmed.is_empty() {
        return Ok(clean_items(std::iter::once(trimmed), texts));
    }

    Err(ProviderError::ParseError(format!(
        "expected a JSON array of {} string(s), got: {}",
        texts.len(),
        preview(answer)
    )))
}

fn clean_items<'a>(items: impl Iterator<Item = &'a str>, texts: &[String]) -> Vec<String> {
    items
        .enumerate()
        .map(|(i, item)| strip_wrapping_quotes(item, texts.get(i)))
        .collect()
}

fn parse_json_array(answer: &str) -> Option<Vec<String>> {
    let start = answer.find('[')?;
    let end = answer.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<String>>(&answer[start..=end]).ok()
}

const QUOTE_PAIRS: [(char, char); 4] = [('"', '"'), ('\u{201c}', '\u{201d}'), ('\u{201e}', '\u{201c}'), ('\'', '\'')];

fn is_wrapped(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() >= 2
        && QUOTE_PAIRS
            .iter()
            .any(|&(open, close)| text.starts_with(open) && text.ends_with(close))
}

/// Remove one pair of quotes wrapping the whole item.
fn strip_wrapping_quotes(item: &str, original: Option<&String>) -> String {
    let item = item.trim();
    if original.is_some_and(|text| is_wrapped(text)) {
        return item.to_string();
    }
    for (open, close) in QUOTE_PAIRS {
        if let Some(inner) = item.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
            return inner.trim().to_string();
        }
    }
    item.to_string()
}

fn preview(answer: &str) -> String {
    if answer.chars().count() > 200 {
        format!("{}...", answer.chars().take(200).collect::<String>())
    } else {
        answer.to_string()
    }
}
