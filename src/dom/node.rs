//! Element tree representation
//!
//! Elements are built bottom-up by the parsers: an in-progress element is
//! owned by the parser's build stack and only handed to its parent (behind an
//! `Arc`) once its scope closes. A finished tree is immutable and shared.

use crate::options::names_match;
use indexmap::IndexMap;
use std::sync::Arc;

/// Name of the synthetic element that wraps all top-level content
pub const ROOT_ELEMENT_NAME: &str = "__xmlindexer_root__";

/// An attribute: name plus its raw, uncoerced text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub text: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        XmlAttribute {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A text or CDATA fragment owned by an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    pub text: String,
}

/// One child of an element, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    Element(Arc<Element>),
    Text(TextElement),
}

impl XmlContent {
    pub fn as_element(&self) -> Option<&Arc<Element>> {
        match self {
            XmlContent::Element(e) => Some(e),
            XmlContent::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlContent::Text(t) => Some(&t.text),
            XmlContent::Element(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    /// Ordinal among the parent's element children
    index: usize,
    case_insensitive: bool,
    namespace: Option<String>,
    /// Keyed by name as written; re-inserting a name replaces the value in place
    attributes: IndexMap<String, XmlAttribute>,
    children: Vec<XmlContent>,
    /// Ordinal handed to the next element child
    next_ordinal: usize,
}

impl Element {
    pub fn new(name: impl Into<String>, index: usize, case_insensitive: bool) -> Self {
        Element {
            name: name.into(),
            index,
            case_insensitive,
            namespace: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
            next_ordinal: 0,
        }
    }

    /// Fresh root sentinel
    pub fn root(case_insensitive: bool) -> Self {
        Self::new(ROOT_ELEMENT_NAME, 0, case_insensitive)
    }

    /// Start a new child scope under this element.
    ///
    /// The child is assigned the next sibling ordinal and inherits the case
    /// rule; it becomes part of this element only once passed to
    /// [`attach_child`](Self::attach_child).
    pub fn add_child_element<N, V, I>(&mut self, name: impl Into<String>, attributes: I) -> Element
    where
        N: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (N, V)>,
    {
        let mut child = Element::new(name, self.next_ordinal, self.case_insensitive);
        self.next_ordinal += 1;
        for (name, value) in attributes {
            child.set_attribute(name, value);
        }
        child
    }

    /// Append a finished child element
    pub fn attach_child(&mut self, child: Element) {
        self.children.push(XmlContent::Element(Arc::new(child)));
    }

    /// Append a text fragment; adjacent fragments are not merged
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlContent::Text(TextElement { text: text.into() }));
    }

    /// Register an attribute; a repeated name keeps its first position and
    /// takes the latest value
    pub fn set_attribute(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let name = name.into();
        let attribute = XmlAttribute::new(name.clone(), text);
        self.attributes.insert(name, attribute);
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }

    /// Copy of this element carrying a different child list
    pub(crate) fn with_children(&self, children: Vec<XmlContent>) -> Element {
        Element {
            name: self.name.clone(),
            index: self.index,
            case_insensitive: self.case_insensitive,
            namespace: self.namespace.clone(),
            attributes: self.attributes.clone(),
            next_ordinal: children.iter().filter(|c| c.as_element().is_some()).count(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_ELEMENT_NAME
    }

    /// Whether this element's name matches `key` under its case rule
    pub fn name_matches(&self, key: &str) -> bool {
        names_match(&self.name, key, self.case_insensitive)
    }

    /// All content, elements and text, in document order
    pub fn children(&self) -> &[XmlContent] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Arc<Element>> + '_ {
        self.children.iter().filter_map(XmlContent::as_element)
    }

    /// Concatenation of the text fragments directly owned by this element
    pub fn text(&self) -> String {
        self.children.iter().filter_map(XmlContent::as_text).collect()
    }

    /// All text in this subtree, in document order
    pub fn recursive_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlContent::Text(t) => out.push_str(&t.text),
                XmlContent::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialized children, without this element's own tags
    pub fn inner_xml(&self) -> String {
        self.children.iter().map(ToString::to_string).collect()
    }

    /// Attribute lookup under the case rule. With case folding, when several
    /// stored names fold to the same key the last one wins.
    pub fn attribute(&self, name: &str) -> Option<&XmlAttribute> {
        if !self.case_insensitive {
            return self.attributes.get(name);
        }
        self.attributes
            .values()
            .rev()
            .find(|a| names_match(&a.name, name, true))
    }

    /// Attributes in first-seen order
    pub fn all_attributes(&self) -> impl ExactSizeIterator<Item = &XmlAttribute> + '_ {
        self.attributes.values()
    }
}

/// Structural equality; attribute order counts, build bookkeeping does not
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.index == other.index
            && self.case_insensitive == other.case_insensitive
            && self.namespace == other.namespace
            && self.attributes.iter().eq(other.attributes.iter())
            && self.children == other.children
    }
}
