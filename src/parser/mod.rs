//! Tree construction over the event stream
//!
//! Both parsers are [`ParseHandler`]s driven by the same scanning loop,
//! [`run_pass`]. A pass never fails half-way from the handler's point of
//! view: a fatal scan error simply ends the event stream, and the caller
//! decides at the boundary whether that error is reported or the partial
//! tree is kept.

pub mod full;
pub mod lazy;

use crate::core::tokenizer::ParseError;
use crate::dom::Element;
use crate::error::DocumentError;
use crate::options::ParserOptions;
use crate::reader::{SliceReader, StartElement, XmlEvent};
use tracing::{debug, instrument, warn};

pub use full::FullParser;
pub use lazy::{IndexOp, LazyParser};

/// Receiver of the events of one pass
pub trait ParseHandler {
    fn start_element(&mut self, element: StartElement<'_>);

    fn end_element(&mut self, name: &str);

    /// Text and CDATA content alike
    fn text(&mut self, text: &str);
}

/// Run one complete scan of `input`, feeding every event to `handler`.
///
/// Returns the fatal error that ended the scan early, if any.
#[instrument(level = "debug", skip_all, fields(bytes = input.len()))]
pub(crate) fn run_pass<H: ParseHandler>(
    input: &[u8],
    namespaces: bool,
    handler: &mut H,
) -> Option<ParseError> {
    let mut reader = if namespaces {
        SliceReader::with_namespaces(input)
    } else {
        SliceReader::new(input)
    };

    let mut events = 0usize;
    while let Some(event) = reader.next_event() {
        events += 1;
        match event {
            XmlEvent::StartElement(start) => handler.start_element(start),
            XmlEvent::EmptyElement(start) => {
                let name = start.name.clone();
                handler.start_element(start);
                handler.end_element(&name);
            }
            XmlEvent::EndElement(end) => handler.end_element(&end.name),
            XmlEvent::Text(text) | XmlEvent::CData(text) => handler.text(&text),
        }
    }

    let error = reader.error().cloned();
    debug!(events, failed = error.is_some(), "pass finished");
    error
}

/// Apply the error policy to the outcome of a pass
pub(crate) fn check_pass(
    error: Option<ParseError>,
    options: &ParserOptions,
) -> Result<(), DocumentError> {
    let Some(error) = error else {
        return Ok(());
    };

    if options.detect_parsing_errors {
        return Err(DocumentError::Malformed {
            line: error.line,
            column: error.column,
            message: error.message,
        });
    }

    warn!(
        line = error.line,
        column = error.column,
        message = %error.message,
        "malformed input, keeping partial tree"
    );
    Ok(())
}

/// Fold every still-open scope into its parent and return the root
pub(crate) fn close_scopes(mut stack: Vec<Element>, case_insensitive: bool) -> Element {
    while stack.len() > 1 {
        if let Some(child) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.attach_child(child);
            }
        }
    }
    stack.pop().unwrap_or_else(|| Element::root(case_insensitive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl ParseHandler for Recorder {
        fn start_element(&mut self, element: StartElement<'_>) {
            self.log.push(format!("+{}", element.name));
        }

        fn end_element(&mut self, name: &str) {
            self.log.push(format!("-{name}"));
        }

        fn text(&mut self, text: &str) {
            self.log.push(format!("'{text}'"));
        }
    }

    #[test]
    fn test_empty_element_is_start_then_end() {
        let mut recorder = Recorder::default();
        let error = run_pass(b"<a><b/>x<![CDATA[y]]></a>", false, &mut recorder);
        assert!(error.is_none());
        assert_eq!(recorder.log, vec!["+a", "+b", "-b", "'x'", "'y'", "-a"]);
    }

    #[test]
    fn test_error_policy() {
        let mut recorder = Recorder::default();
        let error = run_pass(b"<a>\n  <b", false, &mut recorder);
        assert!(error.is_some());

        let lenient = ParserOptions::default();
        assert!(check_pass(error.clone(), &lenient).is_ok());

        let strict = ParserOptions {
            detect_parsing_errors: true,
            ..ParserOptions::default()
        };
        assert_eq!(
            check_pass(error, &strict),
            Err(DocumentError::Malformed {
                line: 2,
                column: 3,
                message: "unterminated start tag".into(),
            })
        );
    }

    #[test]
    fn test_close_scopes_folds_into_parents() {
        let mut root = Element::root(false);
        let mut a = root.add_child_element("a", Vec::<(String, String)>::new());
        let b = a.add_child_element("b", Vec::<(String, String)>::new());
        let root = close_scopes(vec![root, a, b], false);
        assert_eq!(root.to_string(), "<a><b></b></a>");
    }
}
