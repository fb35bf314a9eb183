/*!
 * Output validation service.
 *
 * Re-parses the serialized output and compares its structural markers with
 * the markers taken from the input before any rewrite.
 */

use log::debug;

use crate::document::{parse_bytes, Document};
use crate::errors::ValidationError;

use super::structure::{StructureSummary, DEFAULT_REFERENCE_ATTRIBUTES};

/// Checks translated output against its input
#[derive(Debug, Clone)]
pub struct OutputValidator {
    reference_attributes: Vec<String>,
}

impl Default for OutputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_ATTRIBUTES.iter().map(|s| s.to_string()).collect())
    }
}

impl OutputValidator {
    /// Create a validator counting the given reference attributes
    pub fn new(reference_attributes: Vec<String>) -> Self {
        Self { reference_attributes }
    }

    /// Markers of a document, taken before it is rewritten
    pub fn summarize(&self, document: &Document) -> StructureSummary {
        StructureSummary::of(document, &self.reference_attributes)
    }

    /// Re-parse `output`, which must be well-formed XML 1.0
    pub fn check_well_formed(output: &[u8]) -> Result<Document, ValidationError> {
        parse_bytes(output).map_err(|e| ValidationError::MalformedOutput(e.to_string()))
    }

    /// Check that `output` parses and matches the input markers
    pub fn validate(&self, before: &StructureSummary, output: &[u8]) -> Result<StructureSummary, ValidationError> {
        let document = Self::check_well_formed(output)?;
        let after = self.summarize(&document);

        if let Some(divergence) = before.first_divergence(&after) {
            return Err(divergence);
        }

        debug!(
            "Output validated: {} element(s), {} attribute(s), {} resolved reference(s)",
            after.elements,
            after.attributes,
            after.resolved_references()
        );
        Ok(after)
    }
}
