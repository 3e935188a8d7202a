//! Query/index algebra
//!
//! [`XmlIndexer`] is the value every query step produces. It is backed
//! either by finished elements (eager parse, or a resolved lazy query) or by
//! a [`DeferredQuery`] that has not been executed yet. Every operation is
//! total over the five variants, and the two error variants absorb every
//! further step, so chains like `xml.by_key("a").by_index(2).by_key("b")`
//! need no intermediate checks.

use crate::dom::{Element, XmlAttribute, XmlContent};
use crate::error::{DocumentError, Error, IndexingError};
use crate::options::names_match;
use crate::parser::lazy::{DisplayPath, IndexOp, LazyParser};
use crate::path::{self, PathError};
use std::fmt;
use std::sync::Arc;

/// An unexecuted request path bound to a lazy parser
#[derive(Debug, Clone)]
pub struct DeferredQuery {
    parser: Arc<LazyParser>,
    ops: Vec<IndexOp>,
}

impl DeferredQuery {
    pub fn new(parser: Arc<LazyParser>) -> Self {
        DeferredQuery {
            parser,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[IndexOp] {
        &self.ops
    }

    /// Scan the input and return what the path selects. Every call scans
    /// again from scratch.
    pub fn resolve(&self) -> XmlIndexer {
        self.parser.resolve(&self.ops)
    }

    fn with_op(&self, op: IndexOp) -> Self {
        let mut ops = self.ops.clone();
        ops.push(op);
        DeferredQuery {
            parser: Arc::clone(&self.parser),
            ops,
        }
    }

    /// Bind the last op's position, if there is an unbound one
    fn bind_last(&self, index: usize) -> Option<Self> {
        let last = self.ops.last().filter(|op| !op.is_bound())?;
        let mut ops = self.ops.clone();
        let bound = IndexOp::at(last.key.clone(), index);
        if let Some(slot) = ops.last_mut() {
            *slot = bound;
        }
        Some(DeferredQuery {
            parser: Arc::clone(&self.parser),
            ops,
        })
    }
}

impl fmt::Display for DeferredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&DisplayPath(&self.ops), f)
    }
}

/// Result of a query step
#[derive(Debug, Clone)]
pub enum XmlIndexer {
    Element(Arc<Element>),
    List(Vec<Arc<Element>>),
    Stream(DeferredQuery),
    Error(IndexingError),
    ParsingError(DocumentError),
}

/// Anything usable as one subscript step: a child key or a position
pub trait XmlIndex {
    fn index_into(&self, indexer: &XmlIndexer) -> XmlIndexer;
}

impl XmlIndex for &str {
    fn index_into(&self, indexer: &XmlIndexer) -> XmlIndexer {
        indexer.by_key(self)
    }
}

impl XmlIndex for String {
    fn index_into(&self, indexer: &XmlIndexer) -> XmlIndexer {
        indexer.by_key(self)
    }
}

impl XmlIndex for usize {
    fn index_into(&self, indexer: &XmlIndexer) -> XmlIndexer {
        indexer.by_index(*self)
    }
}

impl XmlIndexer {
    /// Indexer over the whole document, nothing scanned yet
    pub fn stream(parser: Arc<LazyParser>) -> Self {
        XmlIndexer::Stream(DeferredQuery::new(parser))
    }

    /// Subscript step: a key selects children, a number selects a position
    pub fn get<I: XmlIndex>(&self, index: I) -> XmlIndexer {
        index.index_into(self)
    }

    /// Direct element children named `key`
    pub fn by_key(&self, key: &str) -> XmlIndexer {
        match self {
            XmlIndexer::Element(element) => {
                let mut matches: Vec<_> = element
                    .child_elements()
                    .filter(|child| names_match(child.name(), key, element.is_case_insensitive()))
                    .cloned()
                    .collect();
                match matches.len() {
                    0 => key_not_found(key),
                    1 => XmlIndexer::Element(matches.remove(0)),
                    _ => XmlIndexer::List(matches),
                }
            }
            XmlIndexer::Stream(query) => XmlIndexer::Stream(query.with_op(IndexOp::new(key))),
            XmlIndexer::List(_) => key_not_found(key),
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => self.clone(),
        }
    }

    /// The element at `index` of the current candidate set
    pub fn by_index(&self, index: usize) -> XmlIndexer {
        match self {
            XmlIndexer::List(list) => match list.get(index) {
                Some(element) => XmlIndexer::Element(Arc::clone(element)),
                None => out_of_range(index),
            },
            XmlIndexer::Element(_) if index == 0 => self.clone(),
            XmlIndexer::Element(_) => out_of_range(index),
            XmlIndexer::Stream(query) => match query.bind_last(index) {
                Some(bound) => XmlIndexer::Stream(bound),
                None => query.resolve().by_index(index),
            },
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => self.clone(),
        }
    }

    /// First candidate whose attribute `name` equals `value`
    pub fn with_attribute(&self, name: &str, value: &str) -> XmlIndexer {
        let candidates = match self {
            XmlIndexer::Element(element) => std::slice::from_ref(element),
            XmlIndexer::List(list) => list.as_slice(),
            XmlIndexer::Stream(query) => return query.resolve().with_attribute(name, value),
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => return self.clone(),
        };

        candidates
            .iter()
            .find(|element| {
                element.attribute(name).is_some_and(|attr| {
                    names_match(&attr.text, value, element.is_case_insensitive())
                })
            })
            .map_or_else(
                || {
                    XmlIndexer::Error(IndexingError::AttributeValueMismatch {
                        name: name.to_string(),
                        value: value.to_string(),
                    })
                },
                |element| XmlIndexer::Element(Arc::clone(element)),
            )
    }

    /// The candidate set, one indexer per element; empty for errors
    pub fn all(&self) -> Vec<XmlIndexer> {
        self.elements().into_iter().map(XmlIndexer::Element).collect()
    }

    /// Element children of every candidate, in document order
    pub fn children(&self) -> Vec<XmlIndexer> {
        self.elements()
            .iter()
            .flat_map(|element| element.child_elements().cloned())
            .map(XmlIndexer::Element)
            .collect()
    }

    /// The candidate set as elements; empty for errors
    pub fn elements(&self) -> Vec<Arc<Element>> {
        match self {
            XmlIndexer::Element(element) => vec![Arc::clone(element)],
            XmlIndexer::List(list) => list.clone(),
            XmlIndexer::Stream(query) => query.resolve().elements(),
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => Vec::new(),
        }
    }

    /// Rebuild every candidate keeping only the element children for which
    /// `pred(child, position)` holds. Positions run across the children of
    /// the whole candidate set, not per candidate.
    pub fn filter_children<F>(&self, pred: F) -> XmlIndexer
    where
        F: Fn(&Element, usize) -> bool,
    {
        match self {
            XmlIndexer::Stream(query) => return query.resolve().filter_children(pred),
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => return self.clone(),
            XmlIndexer::Element(_) | XmlIndexer::List(_) => {}
        }

        let mut position = 0;
        let rebuilt: Vec<_> = self
            .elements()
            .iter()
            .map(|element| {
                let mut kept = Vec::new();
                for child in element.child_elements() {
                    if pred(child, position) {
                        kept.push(XmlContent::Element(Arc::clone(child)));
                    }
                    position += 1;
                }
                Arc::new(element.with_children(kept))
            })
            .collect();

        match self {
            XmlIndexer::Element(_) => rebuilt
                .into_iter()
                .next()
                .map_or_else(|| out_of_range(0), XmlIndexer::Element),
            _ => XmlIndexer::List(rebuilt),
        }
    }

    /// Keep the candidates for which `pred(element, position)` holds
    pub fn filter_all<F>(&self, pred: F) -> XmlIndexer
    where
        F: Fn(&Element, usize) -> bool,
    {
        match self {
            XmlIndexer::Stream(query) => return query.resolve().filter_all(pred),
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => return self.clone(),
            XmlIndexer::Element(_) | XmlIndexer::List(_) => {}
        }

        let mut kept: Vec<_> = self
            .elements()
            .into_iter()
            .enumerate()
            .filter(|(position, element)| pred(element, *position))
            .map(|(_, element)| element)
            .collect();

        if kept.len() == 1 {
            XmlIndexer::Element(kept.remove(0))
        } else {
            XmlIndexer::List(kept)
        }
    }

    /// Apply a path expression such as `catalog/book[1]/title`
    pub fn at_path(&self, expression: &str) -> Result<XmlIndexer, PathError> {
        let ops = path::compile(expression)?;
        Ok(ops.iter().fold(self.clone(), |current, op| {
            let next = current.by_key(&op.key);
            match op.index {
                Some(index) => next.by_index(index),
                None => next,
            }
        }))
    }

    /// Resolve a deferred query; any other variant is returned as is
    pub fn resolved(&self) -> XmlIndexer {
        match self {
            XmlIndexer::Stream(query) => query.resolve(),
            other => other.clone(),
        }
    }

    /// The selected element; a list yields its first element
    pub fn value(&self) -> Result<Arc<Element>, Error> {
        match self {
            XmlIndexer::Element(element) => Ok(Arc::clone(element)),
            XmlIndexer::List(list) => list
                .first()
                .cloned()
                .ok_or(IndexingError::IndexOutOfRange { index: 0 }.into()),
            XmlIndexer::Stream(query) => query.resolve().value(),
            XmlIndexer::Error(error) => Err(error.clone().into()),
            XmlIndexer::ParsingError(error) => Err(error.clone().into()),
        }
    }

    /// Attribute `name` of the selected element
    pub fn attribute(&self, name: &str) -> Result<XmlAttribute, Error> {
        let element = self.value()?;
        element.attribute(name).cloned().ok_or_else(|| {
            IndexingError::AttributeMissing {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn element(&self) -> Option<Arc<Element>> {
        self.value().ok()
    }

    pub fn is_ok(&self) -> bool {
        self.error().is_none()
    }

    pub fn error(&self) -> Option<Error> {
        match self {
            XmlIndexer::Error(error) => Some(error.clone().into()),
            XmlIndexer::ParsingError(error) => Some(error.clone().into()),
            XmlIndexer::Stream(query) => query.resolve().error(),
            XmlIndexer::Element(_) | XmlIndexer::List(_) => None,
        }
    }
}

fn key_not_found(key: &str) -> XmlIndexer {
    XmlIndexer::Error(IndexingError::KeyNotFound {
        key: key.to_string(),
    })
}

fn out_of_range(index: usize) -> XmlIndexer {
    XmlIndexer::Error(IndexingError::IndexOutOfRange { index })
}

impl fmt::Display for XmlIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlIndexer::Element(element) => fmt::Display::fmt(element, f),
            XmlIndexer::List(list) => {
                for element in list {
                    fmt::Display::fmt(element, f)?;
                }
                Ok(())
            }
            XmlIndexer::Stream(query) => fmt::Display::fmt(&query.resolve(), f),
            XmlIndexer::Error(_) | XmlIndexer::ParsingError(_) => Ok(()),
        }
    }
}

impl IntoIterator for XmlIndexer {
    type Item = XmlIndexer;
    type IntoIter = std::vec::IntoIter<XmlIndexer>;

    fn into_iter(self) -> Self::IntoIter {
        self.all().into_iter()
    }
}

impl IntoIterator for &XmlIndexer {
    type Item = XmlIndexer;
    type IntoIter = std::vec::IntoIter<XmlIndexer>;

    fn into_iter(self) -> Self::IntoIter {
        self.all().into_iter()
    }
}

impl From<Arc<Element>> for XmlIndexer {
    fn from(element: Arc<Element>) -> Self {
        XmlIndexer::Element(element)
    }
}

impl From<IndexingError> for XmlIndexer {
    fn from(error: IndexingError) -> Self {
        XmlIndexer::Error(error)
    }
}

impl From<DocumentError> for XmlIndexer {
    fn from(error: DocumentError) -> Self {
        XmlIndexer::ParsingError(error)
    }
}
