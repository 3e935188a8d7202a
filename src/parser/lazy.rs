//! Lazy parser: materializes only the elements on a requested path
//!
//! A [`LazyParser`] keeps the normalized input and nothing else. Each
//! resolution of a path runs a fresh [`LazyScan`] over the whole input,
//! builds the partial tree the path needs, replays the path against it and
//! throws the scan state away.

use super::{check_pass, close_scopes, run_pass, ParseHandler};
use crate::core::encoding;
use crate::dom::Element;
use crate::error::{DocumentError, IndexingError};
use crate::indexer::XmlIndexer;
use crate::options::{names_match, ParserOptions};
use crate::reader::StartElement;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// One step of a request path: a child key plus an optional bound position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexOp {
    pub key: String,
    pub index: Option<usize>,
}

impl IndexOp {
    pub fn new(key: impl Into<String>) -> Self {
        IndexOp {
            key: key.into(),
            index: None,
        }
    }

    pub fn at(key: impl Into<String>, index: usize) -> Self {
        IndexOp {
            key: key.into(),
            index: Some(index),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.index.is_some()
    }
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{} {}", self.key, index),
            None => f.write_str(&self.key),
        }
    }
}

/// Handle over a retained input that resolves request paths on demand
#[derive(Debug)]
pub struct LazyParser {
    input: Arc<[u8]>,
    options: ParserOptions,
}

impl LazyParser {
    /// Normalize the input encoding and retain it.
    ///
    /// With `detect_parsing_errors` set, one validation pass runs here so
    /// malformed input is reported before any query; nothing from that pass
    /// is kept.
    pub fn new(input: &[u8], options: ParserOptions) -> Result<Self, DocumentError> {
        let input: Arc<[u8]> = Arc::from(encoding::to_utf8(input, options.encoding)?.as_ref());
        if options.detect_parsing_errors {
            let error = run_pass(&input, options.should_process_namespaces, &mut Validate);
            check_pass(error, &options)?;
        }
        Ok(LazyParser { input, options })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Scan the input for `ops` and replay them against the partial tree
    pub fn resolve(&self, ops: &[IndexOp]) -> XmlIndexer {
        let case_insensitive = self.options.case_insensitive;
        debug!(
            bytes = self.input.len(),
            mode = "lazy",
            path = %DisplayPath(ops),
            "resolving"
        );

        let mut scan = LazyScan::new(ops, case_insensitive);
        let error = run_pass(&self.input, self.options.should_process_namespaces, &mut scan);
        if let Err(error) = check_pass(error, &self.options) {
            return XmlIndexer::ParsingError(error);
        }

        let seen = std::mem::take(&mut scan.seen);
        let root = close_scopes(scan.stack, case_insensitive);
        replay(root, ops, &seen)
    }
}

/// Handler for a pass that only checks well-formedness
struct Validate;

impl ParseHandler for Validate {
    fn start_element(&mut self, _element: StartElement<'_>) {}

    fn end_element(&mut self, _name: &str) {}

    fn text(&mut self, _text: &str) {}
}

/// A request path rendered as `[a][b 1]`
pub struct DisplayPath<'a>(pub &'a [IndexOp]);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in self.0 {
            write!(f, "[{op}]")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct OpenTag {
    name: String,
    materialized: bool,
}

/// Per-open-element counters; index 0 is the document level
#[derive(Debug, Default, Clone, Copy)]
struct Level {
    /// Element children seen so far, materialized or not
    children: usize,
    /// Children that matched the requested key at the next depth
    key_matches: usize,
}

/// State of one lazy resolution
struct LazyScan {
    requested_ops: Vec<IndexOp>,
    case_insensitive: bool,
    /// Every open tag, materialized or not
    open_tags: Vec<OpenTag>,
    /// Materialized elements still open, root sentinel at the bottom
    stack: Vec<Element>,
    levels: Vec<Level>,
    /// Total occurrences of each op's key under a materialized parent
    seen: Vec<usize>,
}

impl LazyScan {
    fn new(ops: &[IndexOp], case_insensitive: bool) -> Self {
        LazyScan {
            requested_ops: ops.to_vec(),
            case_insensitive,
            open_tags: Vec::new(),
            stack: vec![Element::root(case_insensitive)],
            levels: vec![Level::default()],
            seen: vec![0; ops.len()],
        }
    }

    fn parent_materialized(&self) -> bool {
        self.open_tags.last().is_none_or(|t| t.materialized)
    }

    /// Prefix rule for a start tag that would sit at `depth` once pushed.
    ///
    /// The zip stops at the shorter side: while depth <= n the live names
    /// must be a prefix of the requested keys, past n the requested keys
    /// must be a prefix of the live names.
    fn prefix_matches(&self, name: &str) -> bool {
        self.open_tags
            .iter()
            .map(|t| t.name.as_str())
            .chain(std::iter::once(name))
            .zip(&self.requested_ops)
            .all(|(live, op)| names_match(live, &op.key, self.case_insensitive))
    }

    fn should_materialize(&mut self, name: &str) -> bool {
        let depth = self.open_tags.len() + 1;

        if !self.parent_materialized() || !self.prefix_matches(name) {
            return false;
        }
        if depth > self.requested_ops.len() {
            return true;
        }

        let parent_level = self.open_tags.len();
        let occurrence = self.levels.get(parent_level).map_or(0, |l| l.key_matches);
        if let Some(level) = self.levels.get_mut(parent_level) {
            level.key_matches += 1;
        }
        if let Some(seen) = self.seen.get_mut(depth - 1) {
            *seen += 1;
        }

        match self.requested_ops.get(depth - 1).and_then(|op| op.index) {
            Some(position) => occurrence == position,
            None => true,
        }
    }
}

impl ParseHandler for LazyScan {
    fn start_element(&mut self, start: StartElement<'_>) {
        let materialized = self.should_materialize(&start.name);
        trace!(
            name = %start.name,
            depth = self.open_tags.len() + 1,
            materialized,
            "start tag"
        );

        let ordinal = match self.levels.last_mut() {
            Some(level) => {
                level.children += 1;
                level.children - 1
            }
            None => 0,
        };

        if materialized {
            let mut element = Element::new(start.name.as_ref(), ordinal, self.case_insensitive);
            for (name, value) in start.attributes {
                element.set_attribute(name, value);
            }
            element.set_namespace(start.namespace);
            self.stack.push(element);
        }

        self.open_tags.push(OpenTag {
            name: start.name.into_owned(),
            materialized,
        });
        self.levels.push(Level::default());
    }

    fn end_element(&mut self, _name: &str) {
        self.levels.pop();
        let Some(tag) = self.open_tags.pop() else {
            return;
        };
        if !tag.materialized || self.stack.len() < 2 {
            return;
        }
        if let Some(child) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.attach_child(child);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if !self.parent_materialized() {
            return;
        }
        if let Some(current) = self.stack.last_mut() {
            current.add_text(text);
        }
    }
}

/// Walk `ops` over the partial tree the scan built.
///
/// A bound step only ever has its narrowed occurrence materialized, so it is
/// taken as found; when the key was seen under a single parent but not that
/// many times, the step fails with the eager parser's out-of-range error.
fn replay(root: Element, ops: &[IndexOp], seen: &[usize]) -> XmlIndexer {
    let mut current = XmlIndexer::Element(Arc::new(root));
    for (op, &seen) in ops.iter().zip(seen) {
        let single_parent = matches!(current, XmlIndexer::Element(_));
        current = match (current.by_key(&op.key), op.index) {
            (XmlIndexer::Error(IndexingError::KeyNotFound { .. }), Some(index))
                if single_parent && seen > 0 =>
            {
                XmlIndexer::Error(IndexingError::IndexOutOfRange { index })
            }
            (next, _) => next,
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<root>\
        <a id=\"1\"><b>first</b><c/></a>\
        <a id=\"2\"><b>second</b><b>third</b></a>\
        <z>skipped</z>\
        </root>";

    fn lazy() -> LazyParser {
        LazyParser::new(DOC.as_bytes(), ParserOptions::default()).unwrap()
    }

    #[test]
    fn test_index_op_display() {
        assert_eq!(IndexOp::new("a").to_string(), "a");
        assert_eq!(IndexOp::at("b", 1).to_string(), "b 1");
        let path = [IndexOp::new("a"), IndexOp::at("b", 1)];
        assert_eq!(DisplayPath(&path).to_string(), "[a][b 1]");
    }

    #[test]
    fn test_only_requested_path_is_materialized() {
        let result = lazy().resolve(&[IndexOp::new("root")]);
        let root = result.element().unwrap();
        // everything below the requested path is built
        assert_eq!(root.child_elements().count(), 3);

        let result = lazy().resolve(&[IndexOp::new("root"), IndexOp::new("z")]);
        assert_eq!(result.element().unwrap().text(), "skipped");
    }

    #[test]
    fn test_partial_tree_shape() {
        let ops = [IndexOp::new("root"), IndexOp::at("a", 1)];
        let mut scan = LazyScan::new(&ops, false);
        let error = run_pass(DOC.as_bytes(), false, &mut scan);
        assert!(error.is_none());
        let root = close_scopes(scan.stack, false);
        assert_eq!(
            root.to_string(),
            "<root><a id=\"2\"><b>second</b><b>third</b></a></root>"
        );
    }

    #[test]
    fn test_bound_position_keeps_ordinal() {
        let result = lazy().resolve(&[IndexOp::new("root"), IndexOp::at("a", 1)]);
        let a = result.element().unwrap();
        assert_eq!(a.index(), 1);
        assert_eq!(a.attribute("id").map(|a| a.text.as_str()), Some("2"));
    }

    #[test]
    fn test_bound_position_out_of_range() {
        let result = lazy().resolve(&[IndexOp::new("root"), IndexOp::at("a", 5)]);
        assert_eq!(
            result.error(),
            Some(IndexingError::IndexOutOfRange { index: 5 }.into())
        );

        let result = lazy().resolve(&[IndexOp::new("root"), IndexOp::at("missing", 0)]);
        assert_eq!(
            result.error(),
            Some(IndexingError::KeyNotFound { key: "missing".into() }.into())
        );
    }

    #[test]
    fn test_unbound_multiple_matches_is_list() {
        let result = lazy().resolve(&[IndexOp::new("root"), IndexOp::new("a")]);
        assert_eq!(result.all().len(), 2);
    }

    #[test]
    fn test_case_insensitive_keys() {
        let options = ParserOptions {
            case_insensitive: true,
            ..ParserOptions::default()
        };
        let parser = LazyParser::new(DOC.as_bytes(), options).unwrap();
        let result = parser.resolve(&[IndexOp::new("ROOT"), IndexOp::new("Z")]);
        assert_eq!(result.element().unwrap().text(), "skipped");
    }

    #[test]
    fn test_strict_mode_reports_malformed() {
        let options = ParserOptions {
            detect_parsing_errors: true,
            ..ParserOptions::default()
        };
        let error = LazyParser::new(b"<a><b></a>", options.clone()).unwrap_err();
        assert_eq!(
            error,
            DocumentError::Malformed {
                line: 1,
                column: 7,
                message: "mismatched end tag: expected </b>, found </a>".into(),
            }
        );
        assert!(LazyParser::new(b"<a><b/></a>", options).is_ok());
    }

    #[test]
    fn test_lenient_mode_keeps_partial_tree() {
        let parser = LazyParser::new(b"<a><b>x</b><c></a>", ParserOptions::default()).unwrap();
        let result = parser.resolve(&[IndexOp::new("a"), IndexOp::new("b")]);
        assert_eq!(result.element().unwrap().text(), "x");
    }
}
