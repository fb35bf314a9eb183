/*!
 * Translation of located workbook text.
 *
 * This module turns located fragments into translated output. It is split
 * into several submodules:
 *
 * - `batch`: deduplication into translation units and batching
 * - `gateway`: batch contract and retries around a provider
 * - `prompts`: prompt templates and answer parsing for LLM providers
 * - `rewriter`: writing translations back into the tree
 * - `pipeline`: the end-to-end run for one workbook
 */

// Re-export main types for easier usage
pub use self::batch::{Batch, PlanStats, TranslationPlan, TranslationUnit, DEFAULT_BATCH_SIZE};
pub use self::gateway::{RetryPolicy, TranslationGateway};
pub use self::pipeline::{
    plan_document, BatchProgress, PipelineOptions, PipelineOutput, RunReport, TranslationPipeline,
};
pub use self::rewriter::{RewriteStats, Rewriter};

// Submodules
pub mod batch;
pub mod gateway;
pub mod pipeline;
pub mod prompts;
pub mod rewriter;
