/*!
 * Translation pipeline for a single workbook.
 *
 * bytes → tree → fragments → units → batches → gateway → rewrite → bytes →
 * validation. The pipeline never touches the filesystem; the controller
 * decides what gets written, and it only receives bytes after every batch
 * succeeded and the output passed validation.
 */

use std::fmt;

use log::{error, info};
use serde::Serialize;

use crate::document::{parse_bytes, to_bytes, Document};
use crate::errors::{AppError, DocumentError};
use crate::extraction::{locate, RuleSet};
use crate::providers::Provider;
use crate::validation::OutputValidator;

use super::batch::{TranslationPlan, DEFAULT_BATCH_SIZE};
use super::gateway::{RetryPolicy, TranslationGateway};
use super::rewriter::Rewriter;

/// Settings for one run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Target language name passed to the gateway
    pub target_language: String,
    /// Maximum number of units per batch
    pub batch_size: usize,
    /// Retry settings for gateway calls
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            target_language: "English".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Progress notification sent after each completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Number of batches completed so far
    pub completed: usize,
    /// Total number of batches
    pub total: usize,
    /// Units in the batch just completed
    pub units: usize,
}

/// Counters describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Fragments found by the locator
    pub fragments: usize,
    /// Distinct texts submitted
    pub units: usize,
    /// Gateway calls made (or planned, for a dry run)
    pub batches: usize,
    /// Locations covered by the units
    pub locations: usize,
    /// Locations whose value changed
    pub rewritten: usize,
    /// Reference sites attached to a translated text
    pub references_followed: usize,
    /// Reference sites naming nothing that gets translated
    pub references_unmatched: usize,
    /// Fragment count per rule label
    pub per_rule: Vec<(String, usize)>,
}

impl RunReport {
    /// Report for a plan that has not been executed
    pub fn planned(plan: &TranslationPlan, rules: &RuleSet, batch_size: usize) -> Self {
        let stats = plan.stats();
        Self {
            fragments: stats.fragments,
            units: plan.units().len(),
            batches: plan.batch_count(batch_size),
            locations: plan.location_count(),
            rewritten: 0,
            references_followed: stats.references_followed,
            references_unmatched: stats.references_unmatched,
            per_rule: stats
                .per_rule
                .iter()
                .filter_map(|(&rule, &count)| rules.rules().get(rule).map(|r| (r.label(), count)))
                .collect(),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fragments located:   {}", self.fragments)?;
        writeln!(f, "Translation units:   {}", self.units)?;
        writeln!(f, "Batches:             {}", self.batches)?;
        writeln!(f, "Locations:           {}", self.locations)?;
        writeln!(f, "Rewritten:           {}", self.rewritten)?;
        write!(
            f,
            "References followed: {} ({} unmatched)",
            self.references_followed, self.references_unmatched
        )?;
        for (label, count) in &self.per_rule {
            write!(f, "\n  {:<20} {}", label, count)?;
        }
        Ok(())
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Serialized, validated output document
    pub bytes: Vec<u8>,
    /// Run counters
    pub report: RunReport,
}

/// Parse a workbook and plan its translation without calling any provider
pub fn plan_document(input: &[u8], rules: &RuleSet) -> Result<(Document, TranslationPlan), DocumentError> {
    let document = parse_bytes(input)?;
    let plan = TranslationPlan::build(locate(&document, rules));
    Ok((document, plan))
}

/// Runs the whole translation of one workbook
#[derive(Debug)]
pub struct TranslationPipeline<'a> {
    rules: &'a RuleSet,
    provider: &'a dyn Provider,
    validator: Option<OutputValidator>,
    options: PipelineOptions,
}

impl<'a> TranslationPipeline<'a> {
    /// Create a pipeline with the default output validator
    pub fn new(rules: &'a RuleSet, provider: &'a dyn Provider, options: PipelineOptions) -> Self {
        Self {
            rules,
            provider,
            validator: Some(OutputValidator::default()),
            options,
        }
    }

    /// Replace the output validator; `None` disables validation
    pub fn with_validator(mut self, validator: Option<OutputValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Run options
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Translate `input`
    pub async fn run(&self, input: &[u8]) -> Result<PipelineOutput, AppError> {
        self.run_with_progress(input, |_| {}).await
    }

    /// Translate `input`, calling `progress` after each batch
    pub async fn run_with_progress<F>(&self, input: &[u8], mut progress: F) -> Result<PipelineOutput, AppError>
    where
        F: FnMut(BatchProgress),
    {
        let (mut document, plan) = plan_document(input, self.rules)?;
        let mut report = RunReport::planned(&plan, self.rules, self.options.batch_size);
        let before = self.validator.as_ref().map(|validator| validator.summarize(&document));

        let gateway = TranslationGateway::new(self.provider, self.options.target_language.clone(), self.options.retry)
            .with_preserve_terms(self.rules.exclusions().to_vec());

        let mut rewriter = Rewriter::new(&mut document);
        for batch in plan.batches(self.options.batch_size) {
            let translations = gateway.translate_batch(&batch).await.map_err(|e| {
                error!("Aborting run: {}", e);
                e
            })?;

            for (unit, translation) in batch.units.iter().zip(&translations) {
                rewriter.apply(unit, translation)?;
            }

            progress(BatchProgress {
                completed: batch.index + 1,
                total: report.batches,
                units: batch.len(),
            });
        }
        report.rewritten = rewriter.stats().rewritten;

        let bytes = to_bytes(&document);
        let checked = match (&self.validator, &before) {
            (Some(validator), Some(before)) => validator.validate(before, &bytes).map(|_| ()),
            _ => OutputValidator::check_well_formed(&bytes).map(|_| ()),
        };
        checked.map_err(|e| {
            error!("Aborting run: {}", e);
            e
        })?;

        info!(
            "Translated {} unit(s) in {} batch(es) into {}, {} location(s) rewritten",
            report.units, report.batches, self.options.target_language, report.rewritten
        );
        Ok(PipelineOutput { bytes, report })
    }
}
