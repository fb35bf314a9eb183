/*!
 * Validation of translated output.
 *
 * - `structure`: structural markers of a document (element, attribute and
 *   reference counts)
 * - `service`: re-parses the output and compares markers with the input
 */

pub mod service;
pub mod structure;

// Re-export main types
pub use service::OutputValidator;
pub use structure::{StructureSummary, DEFAULT_REFERENCE_ATTRIBUTES};
