/*!
 * Rewriter.
 *
 * Writes the translation of a unit into every location of the unit. The
 * whitespace around the original text is kept around the translation, so
 * `" Kokku "` translated as `"Total"` becomes `" Total "`. Values that come
 * out identical are left untouched and keep their original bytes.
 */

use crate::document::{Document, Node};
use crate::errors::TranslationError;
use crate::extraction::{Location, Slot};

use super::batch::TranslationUnit;

/// Counters for one rewrite pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    /// Locations whose value changed
    pub rewritten: usize,
    /// Locations whose translation equals the original
    pub unchanged: usize,
}

/// In-place rewriter over one document
#[derive(Debug)]
pub struct Rewriter<'d> {
    document: &'d mut Document,
    stats: RewriteStats,
}

impl<'d> Rewriter<'d> {
    /// Start rewriting `document`
    pub fn new(document: &'d mut Document) -> Self {
        Self {
            document,
            stats: RewriteStats::default(),
        }
    }

    /// Write `translation` into every location of `unit`
    pub fn apply(&mut self, unit: &TranslationUnit, translation: &str) -> Result<(), TranslationError> {
        for location in &unit.locations {
            self.write(location, &unit.text, translation)?;
        }
        Ok(())
    }

    /// Counters so far
    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    fn write(&mut self, location: &Location, expected: &str, translation: &str) -> Result<(), TranslationError> {
        let stale = || TranslationError::StaleLocation {
            path: location.element_path().to_vec(),
            expected: expected.to_string(),
        };

        let element = self.document.element_at_mut(location.element_path()).ok_or_else(stale)?;

        let changed = match location.slot() {
            Slot::Attribute(index) => {
                let attribute = element.attributes.get_mut(index).ok_or_else(stale)?;
                let value = replacement(attribute.value(), expected, translation).ok_or_else(stale)?;
                let changed = value != attribute.value();
                attribute.set_value(&value);
                changed
            }
            Slot::Text(index) => {
                let Some(Node::Text(run)) = element.children.get_mut(index) else {
                    return Err(stale());
                };
                let value = replacement(run.value(), expected, translation).ok_or_else(stale)?;
                let changed = value != run.value();
                run.set_value(&value);
                changed
            }
        };

        if changed {
            self.stats.rewritten += 1;
        } else {
            self.stats.unchanged += 1;
        }
        Ok(())
    }
}

/// New value for `current`, or `None` if it no longer holds `expected`
fn replacement(current: &str, expected: &str, translation: &str) -> Option<String> {
    if current != expected {
        return None;
    }
    let trimmed_start = expected.trim_start();
    let lead = &expected[..expected.len() - trimmed_start.len()];
    let trail = &trimmed_start[trimmed_start.trim_end().len()..];
    Some(format!("{}{}{}", lead, translation.trim(), trail))
}
