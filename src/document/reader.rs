/*!
 * Tree loader.
 *
 * Builds a [`Document`] from workbook bytes with quick-xml. The reader records
 * the byte range of every event so that each node can keep its source text;
 * attribute values are located inside the raw start tag with a small quote
 * scanner and decoded through quick-xml, which also performs the
 * well-formedness checks.
 */

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::errors::DocumentError;

use super::model::{Attribute, Document, Element, Node, TextRun};

const BOM: char = '\u{feff}';

/// Parse raw workbook bytes
pub fn parse_bytes(bytes: &[u8]) -> Result<Document, DocumentError> {
    let source = std::str::from_utf8(bytes).map_err(|e| DocumentError::Encoding(e.to_string()))?;
    parse_str(source)
}

/// Parse a workbook from a string
pub fn parse_str(source: &str) -> Result<Document, DocumentError> {
    let (bom, body) = match source.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, source),
    };

    if let Some((position, c)) = body.char_indices().find(|&(_, c)| !is_xml_char(c)) {
        return Err(malformed(position, forbidden_char(c)));
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(false);

    let mut open: Vec<Element> = Vec::new();
    let mut top_level: Vec<Node> = Vec::new();
    let mut has_root = false;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| malformed(reader.buffer_position() as usize, e))?;
        let end = reader.buffer_position() as usize;
        let raw = &body[start..end];

        let node = match event {
            Event::Start(tag) => {
                open.push(read_element(&tag, raw, start, false)?);
                continue;
            }
            Event::Empty(tag) => Node::Element(read_element(&tag, raw, start, true)?),
            Event::End(_) => {
                let mut element = open
                    .pop()
                    .ok_or_else(|| malformed(start, "end tag without a matching start tag"))?;
                element.end_tag = Some(raw.to_string());
                Node::Element(element)
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| malformed(start, e))?;
                check_chars(&value, start)?;
                if open.is_empty() && !value.trim().is_empty() {
                    return Err(malformed(start, "text outside of the root element"));
                }
                Node::Text(TextRun::from_source(value.into_owned(), raw.to_string()))
            }
            Event::CData(_) | Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {
                Node::Verbatim(raw.to_string())
            }
            Event::Eof => break,
        };

        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                if matches!(node, Node::Element(_)) {
                    if has_root {
                        return Err(malformed(start, "more than one root element"));
                    }
                    has_root = true;
                }
                top_level.push(node);
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(malformed(body.len(), format!("element <{}> is never closed", unclosed.name)));
    }
    if !has_root {
        return Err(malformed(body.len(), "document has no root element"));
    }

    debug!("Parsed document: {} top-level node(s), {} bytes", top_level.len(), body.len());

    Ok(Document {
        bom,
        children: top_level,
    })
}

/// Build an element from a start (or empty) tag and its raw source text
fn read_element(tag: &BytesStart<'_>, raw: &str, position: usize, self_closing: bool) -> Result<Element, DocumentError> {
    let name = std::str::from_utf8(tag.name().as_ref())
        .map_err(|e| malformed(position, e))?
        .to_string();

    let mut decoded = Vec::new();
    for attribute in tag.attributes() {
        let attribute = attribute.map_err(|e| malformed(position, e))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| malformed(position, e))?
            .to_string();
        let value = attribute.unescape_value().map_err(|e| malformed(position, e))?.into_owned();
        check_chars(&value, position)?;
        decoded.push((key, value));
    }

    // `<` + name ... (`>` | `/>`)
    let closing = if self_closing { 2 } else { 1 };
    let interior = raw
        .get(1 + name.len()..raw.len().saturating_sub(closing))
        .ok_or_else(|| malformed(position, "truncated tag"))?;
    let (spans, tag_tail) = scan_attribute_spans(interior);

    if spans.len() != decoded.len() {
        return Err(malformed(
            position,
            format!("could not align attributes of <{}> with their source text", name),
        ));
    }

    let attributes = decoded
        .into_iter()
        .zip(spans)
        .map(|((key, value), span)| Attribute::from_source(key, value, span.raw, span.quote, span.lead))
        .collect();

    Ok(Element {
        name,
        attributes,
        tag_tail,
        children: Vec::new(),
        end_tag: if self_closing { None } else { Some(String::new()) },
    })
}

struct AttributeSpan {
    lead: String,
    quote: char,
    raw: String,
}

/// Split the inside of a start tag (after the name) into attribute spans.
///
/// Outside of values a tag holds only names, whitespace and `=`, and a value
/// cannot contain its own delimiter, so every quote pair is one value.
fn scan_attribute_spans(interior: &str) -> (Vec<AttributeSpan>, String) {
    let mut spans = Vec::new();
    let mut rest = interior;

    while let Some(open_at) = rest.find(['\'', '"']) {
        let quote = if rest[open_at..].starts_with('\'') { '\'' } else { '"' };
        let after_open = &rest[open_at + 1..];
        let Some(close_at) = after_open.find(quote) else {
            break;
        };
        spans.push(AttributeSpan {
            lead: rest[..open_at].to_string(),
            quote,
            raw: after_open[..close_at].to_string(),
        });
        rest = &after_open[close_at + 1..];
    }

    (spans, rest.to_string())
}

/// XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Reject decoded values that character references smuggled outside `Char`
fn check_chars(value: &str, position: usize) -> Result<(), DocumentError> {
    match value.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(malformed(position, forbidden_char(c))),
        None => Ok(()),
    }
}

fn forbidden_char(c: char) -> String {
    format!("character U+{:04X} is not allowed in XML", c as u32)
}

fn malformed(position: usize, message: impl ToString) -> DocumentError {
    DocumentError::MalformedInput {
        position,
        message: message.to_string(),
    }
}
