/*!
 * In-memory workbook tree.
 *
 * Every node keeps the exact source text it was parsed from next to its
 * decoded value, so a tree that was never modified serializes back to the
 * original bytes. Only `Attribute::set_value` and `TextRun::set_value` can
 * change what gets written, and they re-escape nothing but the new value.
 */

use std::borrow::Cow;

use quick_xml::escape::partial_escape;

/// Parsed workbook document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Whether the source started with a UTF-8 byte order mark
    pub(crate) bom: bool,

    /// Prolog, root element and epilog in source order
    pub children: Vec<Node>,
}

/// One child of a document or element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Structural child
    Element(Element),

    /// Character data between markup
    Text(TextRun),

    /// Markup kept byte for byte: comments, CDATA, declarations,
    /// processing instructions and doctypes
    Verbatim(String),
}

/// XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified tag name as written in the source
    pub name: String,

    /// Attributes in source order
    pub attributes: Vec<Attribute>,

    /// Raw text between the last attribute and the closing `>` or `/>`
    pub(crate) tag_tail: String,

    /// Child nodes in source order
    pub children: Vec<Node>,

    /// Raw end tag, `None` for a self-closing element
    pub(crate) end_tag: Option<String>,
}

/// Element attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,

    /// Decoded value
    value: String,

    /// Value exactly as it appears between the quotes
    raw: String,

    /// Quote character used in the source
    quote: char,

    /// Raw text from the end of the previous attribute up to the opening quote
    lead: String,
}

/// Text run inside an element
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Decoded text
    value: String,

    /// Text exactly as it appears in the source
    raw: String,
}

impl Document {
    /// The root element of the document
    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Resolve an element by its child-index path from the document
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.children.get_mut(*first)? {
            Node::Element(element) => element,
            _ => return None,
        };
        for index in rest {
            current = match current.children.get_mut(*index)? {
                Node::Element(element) => element,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Depth-first iterator over all elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        let mut stack: Vec<&Element> = self
            .children
            .iter()
            .rev()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .collect();

        std::iter::from_fn(move || {
            let element = stack.pop()?;
            stack.extend(element.children.iter().rev().filter_map(|node| match node {
                Node::Element(child) => Some(child),
                _ => None,
            }));
            Some(element)
        })
    }
}

impl Element {
    /// Decoded value of the named attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(Attribute::value)
    }

    /// Concatenated decoded text of the direct text runs
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(run) => Some(run.value()),
                _ => None,
            })
            .collect()
    }
}

impl Attribute {
    pub(crate) fn from_source(name: String, value: String, raw: String, quote: char, lead: String) -> Self {
        Self { name, value, raw, quote, lead }
    }

    /// Decoded value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value as written between the quotes
    pub fn raw_value(&self) -> &str {
        &self.raw
    }

    pub(crate) fn quote(&self) -> char {
        self.quote
    }

    pub(crate) fn lead(&self) -> &str {
        &self.lead
    }

    /// Replace the value, keeping the original bytes when nothing changes
    pub fn set_value(&mut self, value: &str) {
        if value == self.value {
            return;
        }
        self.raw = escape_attribute(value, self.quote).into_owned();
        self.value = value.to_string();
    }
}

impl TextRun {
    pub(crate) fn from_source(value: String, raw: String) -> Self {
        Self { value, raw }
    }

    /// Decoded text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Text as written in the source
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Replace the text, keeping the original bytes when nothing changes
    pub fn set_value(&mut self, value: &str) {
        if value == self.value {
            return;
        }
        self.raw = partial_escape(value).into_owned();
        self.value = value.to_string();
    }
}

/// Escape a value for use inside an attribute delimited by `quote`.
///
/// Tabs and line breaks become character references so that attribute value
/// normalization cannot turn them into spaces on the next read.
fn escape_attribute(value: &str, quote: char) -> Cow<'_, str> {
    let escaped = partial_escape(value);
    let needs_more = escaped.contains(|c: char| c == quote || c == '\n' || c == '\r' || c == '\t');
    if !needs_more {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
