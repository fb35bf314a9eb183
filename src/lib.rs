/*!
 * # twbtrans - Tableau workbook translation with AI
 *
 * A Rust library for translating the user-facing text of Tableau workbooks
 * (`.twb`) while leaving every other byte of the file untouched.
 *
 * ## Features
 *
 * - Byte-stable XML tree: unchanged parts of a workbook serialize exactly as read
 * - Configurable extraction rules with a natural-language heuristic
 * - Exclusion list for names and terms that must never be translated
 * - Deduplication, so every occurrence of a text gets the same translation
 * - Batched translation through AI providers:
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Worksheet and dashboard references follow renamed sheets
 * - Structural validation of the output before anything is written
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Workbook tree, loading and serialization
 * - `extraction`: Rules, heuristic and text locator
 * - `translation`: Batching, gateway, rewriting and the pipeline
 * - `validation`: Structural comparison of input and output
 * - `providers`: Client implementations for LLM providers
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use document::{parse_bytes, to_bytes, Document};
pub use errors::{AppError, DocumentError, ErrorKind, ProviderError, TranslationError, ValidationError};
pub use extraction::{locate, RuleSet};
pub use language_utils::{display_name, file_code, get_language_name, normalize_to_part2t};
pub use translation::{PipelineOptions, RunReport, TranslationPipeline};
