//! Eager parser: builds the whole element tree in one pass

use super::{check_pass, close_scopes, run_pass, ParseHandler};
use crate::core::encoding;
use crate::dom::Element;
use crate::error::DocumentError;
use crate::indexer::XmlIndexer;
use crate::options::ParserOptions;
use crate::reader::StartElement;
use std::sync::Arc;
use tracing::debug;

/// Eager tree builder.
///
/// The build stack is reset at the start of every parse, so one instance may
/// be reused for any number of sequential parses.
pub struct FullParser {
    options: ParserOptions,
    /// Open elements, root sentinel at the bottom
    stack: Vec<Element>,
}

impl FullParser {
    pub fn new(options: ParserOptions) -> Self {
        FullParser {
            options,
            stack: Vec::new(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse into an indexer positioned at the root sentinel
    pub fn parse(&mut self, input: &[u8]) -> XmlIndexer {
        match self.parse_tree(input) {
            Ok(root) => XmlIndexer::Element(Arc::new(root)),
            Err(error) => XmlIndexer::ParsingError(error),
        }
    }

    /// Parse into the bare root sentinel element
    pub fn parse_tree(&mut self, input: &[u8]) -> Result<Element, DocumentError> {
        let input = encoding::to_utf8(input, self.options.encoding)?;
        let case_insensitive = self.options.case_insensitive;

        self.stack.clear();
        self.stack.push(Element::root(case_insensitive));

        debug!(bytes = input.len(), mode = "eager", "parsing");
        let error = run_pass(&input, self.options.should_process_namespaces, self);
        check_pass(error, &self.options)?;

        Ok(close_scopes(std::mem::take(&mut self.stack), case_insensitive))
    }
}

impl ParseHandler for FullParser {
    fn start_element(&mut self, start: StartElement<'_>) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        let mut child = parent.add_child_element(start.name, start.attributes);
        child.set_namespace(start.namespace);
        self.stack.push(child);
    }

    fn end_element(&mut self, _name: &str) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(child) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.attach_child(child);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(current) = self.stack.last_mut() {
            current.add_text(text);
        }
    }
}
