/*!
 * Workbook document tree.
 *
 * - `model`: the tree types (`Document`, `Node`, `Element`, `Attribute`, `TextRun`)
 * - `reader`: tree loader built on quick-xml
 * - `writer`: byte-stable serializer
 */

pub mod model;
pub mod reader;
pub mod writer;

pub use model::{Attribute, Document, Element, Node, TextRun};
pub use reader::{parse_bytes, parse_str};
pub use writer::{to_bytes, to_string};
