/*!
 * Extraction of translatable text from a workbook tree.
 *
 * - `rules`: which elements and attributes hold user-facing text
 * - `filter`: the natural-language heuristic
 * - `locator`: the lazy walk producing (location, text) fragments
 */

pub mod filter;
pub mod locator;
pub mod rules;

pub use filter::{TextClass, TextFilter, TextFilterConfig};
pub use locator::{locate, Fragment, Fragments, Location, Slot};
pub use rules::{default_rules, ExtractionConfig, Rule, RuleRole, RuleSet};
