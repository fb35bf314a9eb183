/*!
 * Serializer.
 *
 * Writes a [`Document`] back to text from the raw pieces captured by the
 * reader. Untouched nodes come out byte for byte as they went in.
 */

use super::model::{Document, Element, Node};

/// Serialize a document to a string
pub fn to_string(document: &Document) -> String {
    let mut out = String::new();
    if document.bom {
        out.push('\u{feff}');
    }
    for node in &document.children {
        write_node(&mut out, node);
    }
    out
}

/// Serialize a document to bytes
pub fn to_bytes(document: &Document) -> Vec<u8> {
    to_string(document).into_bytes()
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => write_element(out, element),
        Node::Text(run) => out.push_str(run.raw()),
        Node::Verbatim(raw) => out.push_str(raw),
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for attribute in &element.attributes {
        out.push_str(attribute.lead());
        out.push(attribute.quote());
        out.push_str(attribute.raw_value());
        out.push(attribute.quote());
    }
    out.push_str(&element.tag_tail);

    match &element.end_tag {
        None => out.push_str("/>"),
        Some(end_tag) => {
            out.push('>');
            for child in &element.children {
                write_node(out, child);
            }
            out.push_str(end_tag);
        }
    }
}
