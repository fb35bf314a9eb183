/*!
 * Text locator.
 *
 * Lazily walks a document and yields one [`Fragment`] per matched attribute
 * or text run. The walk is depth-first in document order: an element's
 * attributes come first, then its children in order, so text runs and child
 * elements interleave exactly as they do in the source.
 *
 * A fragment's text is the decoded value exactly as written, surrounding
 * whitespace included, so `'Kokku'` and `' Kokku'` are different texts. The
 * emptiness, exclusion and natural-language checks look at the trimmed value.
 */

use std::collections::VecDeque;

use crate::document::{Document, Element, Node};

use super::rules::{RuleRole, RuleSet};

/// Mutation point inside a single element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Attribute at this index
    Attribute(usize),
    /// Text run at this child index
    Text(usize),
}

/// Opaque handle to exactly one mutation point in a document.
///
/// Valid for as long as the tree keeps its shape, which holds for a whole
/// run because rewriting only replaces values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    element: Vec<usize>,
    slot: Slot,
}

impl Location {
    pub(crate) fn new(element: Vec<usize>, slot: Slot) -> Self {
        Self { element, slot }
    }

    /// Child-index path of the element from the document
    pub fn element_path(&self) -> &[usize] {
        &self.element
    }

    /// Mutation point within the element
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

/// A located text
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Where the text lives
    pub location: Location,
    /// Decoded text, whitespace preserved
    pub text: String,
    /// Role of the rule that matched
    pub role: RuleRole,
    /// Index of the matching rule in the rule set
    pub rule: usize,
}

/// Locate every fragment of `document` selected by `rules`
pub fn locate<'a>(document: &'a Document, rules: &'a RuleSet) -> Fragments<'a> {
    Fragments {
        rules,
        pending: VecDeque::new(),
        stack: vec![Frame {
            element: None,
            children: &document.children,
            path: Vec::new(),
            next_child: 0,
        }],
    }
}

struct Frame<'a> {
    element: Option<&'a Element>,
    children: &'a [Node],
    path: Vec<usize>,
    next_child: usize,
}

/// Lazy, order-stable fragment sequence
pub struct Fragments<'a> {
    rules: &'a RuleSet,
    pending: VecDeque<Fragment>,
    stack: Vec<Frame<'a>>,
}

impl<'a> Fragments<'a> {
    fn enter(&mut self, element: &'a Element, path: Vec<usize>) {
        for (index, attribute) in element.attributes.iter().enumerate() {
            let Some(rule) = self.rules.attribute_rule(element, &attribute.name) else {
                continue;
            };
            if let Some(fragment) = self.fragment(attribute.value(), &path, Slot::Attribute(index), rule) {
                self.pending.push_back(fragment);
            }
        }

        self.stack.push(Frame {
            element: Some(element),
            children: &element.children,
            path,
            next_child: 0,
        });
    }

    fn fragment(&self, value: &str, path: &[usize], slot: Slot, rule: usize) -> Option<Fragment> {
        if !self.rules.accepts(value.trim()) {
            return None;
        }
        Some(Fragment {
            location: Location::new(path.to_vec(), slot),
            text: value.to_string(),
            role: self.rules.rules()[rule].role,
            rule,
        })
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Some(fragment);
            }

            let frame = self.stack.last_mut()?;
            if frame.next_child >= frame.children.len() {
                self.stack.pop();
                continue;
            }

            let index = frame.next_child;
            frame.next_child += 1;
            let parent = frame.element;
            let children: &'a [Node] = frame.children;
            let node = &children[index];
            let mut path = frame.path.clone();
            path.push(index);

            match node {
                Node::Element(child) => self.enter(child, path),
                Node::Text(run) => {
                    // Top-level text is only whitespace between prolog items
                    let Some(parent) = parent else { continue };
                    let Some(rule) = self.rules.text_rule(parent) else { continue };
                    path.pop();
                    if let Some(fragment) = self.fragment(run.value(), &path, Slot::Text(index), rule) {
                        return Some(fragment);
                    }
                }
                Node::Verbatim(_) => {}
            }
        }
    }
}
