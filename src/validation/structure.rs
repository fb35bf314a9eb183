/*!
 * Structural markers of a workbook.
 *
 * Translation only replaces values, so every marker collected here must be
 * equal on the input and on the output. Reference sites are tracked one by
 * one: a site that named a defined sheet before the rewrite must still name
 * one afterwards, which catches a renamed worksheet or dashboard whose
 * references were not renamed with it. A site may start resolving, since a
 * translation can legitimately coincide with another sheet's name.
 */

use std::collections::{BTreeMap, HashSet};

use crate::document::Document;
use crate::errors::ValidationError;

/// Attribute names counted as sheet references by default
pub const DEFAULT_REFERENCE_ATTRIBUTES: [&str; 2] = ["worksheet", "dashboard"];

/// Elements whose `name` attribute defines a sheet
const SHEET_ELEMENTS: [&str; 2] = ["worksheet", "dashboard"];

/// Structural fingerprint of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureSummary {
    /// Number of elements
    pub elements: usize,
    /// Number of attributes over all elements
    pub attributes: usize,
    /// Element count per element name
    pub element_names: BTreeMap<String, usize>,
    /// Occurrence count per reference attribute name
    pub reference_attributes: BTreeMap<String, usize>,
    /// Per reference attribute, in document order: whether its value names a defined sheet
    pub resolved_sites: Vec<bool>,
}

impl StructureSummary {
    /// Collect the markers of `document`
    pub fn of(document: &Document, reference_attributes: &[String]) -> Self {
        let mut summary = Self::default();
        for name in reference_attributes {
            summary.reference_attributes.insert(name.clone(), 0);
        }

        let sheets: HashSet<&str> = document
            .elements()
            .filter(|element| SHEET_ELEMENTS.contains(&element.name.as_str()))
            .filter_map(|element| element.attribute("name"))
            .collect();

        for element in document.elements() {
            summary.elements += 1;
            summary.attributes += element.attributes.len();
            *summary.element_names.entry(element.name.clone()).or_default() += 1;

            for attribute in &element.attributes {
                let Some(count) = summary.reference_attributes.get_mut(&attribute.name) else {
                    continue;
                };
                *count += 1;
                summary.resolved_sites.push(sheets.contains(attribute.value()));
            }
        }

        summary
    }

    /// Number of reference sites that name a defined sheet
    pub fn resolved_references(&self) -> usize {
        self.resolved_sites.iter().filter(|&&resolved| resolved).count()
    }

    /// First marker that differs between `self` (input) and `after` (output)
    pub fn first_divergence(&self, after: &Self) -> Option<ValidationError> {
        let diverged = |marker: String, before: usize, after: usize| {
            (before != after).then_some(ValidationError::StructuralDivergence { marker, before, after })
        };

        if let Some(error) = diverged("element count".into(), self.elements, after.elements) {
            return Some(error);
        }
        if let Some(error) = diverged("attribute count".into(), self.attributes, after.attributes) {
            return Some(error);
        }

        let names: std::collections::BTreeSet<&String> =
            self.element_names.keys().chain(after.element_names.keys()).collect();
        for name in names {
            let before = self.element_names.get(name).copied().unwrap_or(0);
            let now = after.element_names.get(name).copied().unwrap_or(0);
            if let Some(error) = diverged(format!("<{}> elements", name), before, now) {
                return Some(error);
            }
        }

        for (name, &before) in &self.reference_attributes {
            let now = after.reference_attributes.get(name).copied().unwrap_or(0);
            if let Some(error) = diverged(format!("'{}' reference attributes", name), before, now) {
                return Some(error);
            }
        }

        let still_resolved = self
            .resolved_sites
            .iter()
            .zip(after.resolved_sites.iter().chain(std::iter::repeat(&false)))
            .filter(|&(&was, &now)| was && now)
            .count();
        diverged(
            "resolved sheet references".into(),
            self.resolved_references(),
            still_resolved,
        )
    }
}
