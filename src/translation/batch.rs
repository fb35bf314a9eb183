/*!
 * Deduplication and batching.
 *
 * Collapses identical fragment texts into translation units and splits the
 * units into fixed-size batches. Texts are compared exactly: case and
 * surrounding whitespace both count. Units keep the order in which their text was
 * first discovered, so batch contents are reproducible for a given document.
 */

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::extraction::{Fragment, Location, RuleRole};

/// Default number of units per gateway call
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// A deduplicated text and every location holding it
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    /// Original decoded text, whitespace preserved
    pub text: String,
    /// Locations to rewrite, in discovery order
    pub locations: Vec<Location>,
}

/// Counters collected while building a plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanStats {
    /// Fragments received from the locator
    pub fragments: usize,
    /// Reference fragments attached to a unit
    pub references_followed: usize,
    /// Reference fragments without a matching unit
    pub references_unmatched: usize,
    /// Fragment count per rule index
    pub per_rule: BTreeMap<usize, usize>,
}

/// All translation units of one document
#[derive(Debug, Clone, Default)]
pub struct TranslationPlan {
    units: Vec<TranslationUnit>,
    stats: PlanStats,
}

/// A bounded slice of units submitted in one gateway call
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Zero-based batch number
    pub index: usize,
    /// Index of the first unit of the batch within the plan
    pub offset: usize,
    /// Units in submission order
    pub units: &'a [TranslationUnit],
}

impl Batch<'_> {
    /// Texts to submit, in unit order
    pub fn texts(&self) -> Vec<String> {
        self.units.iter().map(|unit| unit.text.clone()).collect()
    }

    /// Number of units in the batch
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the batch has no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl TranslationPlan {
    /// Group fragments into units.
    ///
    /// Translatable fragments create units; reference fragments only join a
    /// unit whose text is identical, wherever that unit was discovered.
    pub fn build(fragments: impl IntoIterator<Item = Fragment>) -> Self {
        let mut units: Vec<TranslationUnit> = Vec::new();
        let mut by_text: HashMap<String, usize> = HashMap::new();
        let mut references: Vec<Fragment> = Vec::new();
        let mut stats = PlanStats::default();

        for fragment in fragments {
            stats.fragments += 1;
            *stats.per_rule.entry(fragment.rule).or_default() += 1;

            if fragment.role == RuleRole::Reference {
                references.push(fragment);
                continue;
            }

            match by_text.get(&fragment.text) {
                Some(&index) => units[index].locations.push(fragment.location),
                None => {
                    by_text.insert(fragment.text.clone(), units.len());
                    units.push(TranslationUnit {
                        text: fragment.text,
                        locations: vec![fragment.location],
                    });
                }
            }
        }

        for reference in references {
            match by_text.get(&reference.text) {
                Some(&index) => {
                    units[index].locations.push(reference.location);
                    stats.references_followed += 1;
                }
                None => stats.references_unmatched += 1,
            }
        }

        debug!(
            "Planned {} unit(s) from {} fragment(s), {} reference(s) followed, {} unmatched",
            units.len(),
            stats.fragments,
            stats.references_followed,
            stats.references_unmatched
        );

        Self { units, stats }
    }

    /// Units in first-discovered order
    pub fn units(&self) -> &[TranslationUnit] {
        &self.units
    }

    /// Counters collected while building
    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }

    /// Whether there is nothing to translate
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of locations across all units
    pub fn location_count(&self) -> usize {
        self.units.iter().map(|unit| unit.locations.len()).sum()
    }

    /// Split the units into batches of at most `size` (a size of 0 counts as 1)
    pub fn batches(&self, size: usize) -> impl Iterator<Item = Batch<'_>> {
        let size = size.max(1);
        self.units
            .chunks(size)
            .enumerate()
            .map(move |(index, units)| Batch {
                index,
                offset: index * size,
                units,
            })
    }

    /// Number of batches for a given batch size
    pub fn batch_count(&self, size: usize) -> usize {
        self.units.len().div_ceil(size.max(1))
    }
}
