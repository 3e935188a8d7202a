//! xmlindexer - XML parsing with eager and lazy materialization
//!
//! Modes:
//! - Eager: the whole element tree is built in one pass (`parse`)
//! - Lazy: index steps are recorded and each terminal read re-scans the
//!   input, building only the elements on the requested path (`lazy`)
//!
//! Both produce an [`XmlIndexer`], so queries read the same either way:
//!
//! ```
//! let xml = xmlindexer::parse("<catalog><book id=\"1\"><title>Rust</title></book></catalog>");
//! let title = xml.by_key("catalog").by_key("book").by_key("title");
//! assert_eq!(title.element().map(|e| e.text()), Some("Rust".to_string()));
//!
//! let lazy = xmlindexer::lazy("<catalog><book id=\"1\"><title>Rust</title></book></catalog>");
//! let book = lazy.by_key("catalog").by_key("book").with_attribute("id", "1");
//! assert!(book.is_ok());
//! ```

pub mod core;
pub mod dom;
pub mod error;
pub mod indexer;
pub mod options;
pub mod parser;
pub mod path;
pub mod reader;

#[cfg(feature = "nif")]
mod nif;

use std::sync::Arc;

pub use dom::{Element, TextElement, XmlAttribute, XmlContent, ROOT_ELEMENT_NAME};
pub use error::{DocumentError, Error, IndexingError, Result};
pub use indexer::{DeferredQuery, XmlIndex, XmlIndexer};
pub use options::{Encoding, ParserOptions};
pub use parser::{FullParser, IndexOp, LazyParser};
pub use path::PathError;

/// A configured entry point
#[derive(Debug, Clone, Default)]
pub struct XmlHash {
    options: ParserOptions,
}

impl XmlHash {
    pub fn new(options: ParserOptions) -> Self {
        XmlHash { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse eagerly, or lazily when `should_process_lazily` is set
    pub fn parse(&self, input: impl AsRef<[u8]>) -> XmlIndexer {
        if self.options.should_process_lazily {
            self.parse_lazily(input)
        } else {
            FullParser::new(self.options.clone()).parse(input.as_ref())
        }
    }

    /// Retain the input and defer all scanning to the first terminal read
    pub fn parse_lazily(&self, input: impl AsRef<[u8]>) -> XmlIndexer {
        match LazyParser::new(input.as_ref(), self.options.clone()) {
            Ok(parser) => XmlIndexer::stream(Arc::new(parser)),
            Err(error) => XmlIndexer::ParsingError(error),
        }
    }
}

/// Build an entry point from a closure over the default options
///
/// ```
/// let hash = xmlindexer::config(|opts| {
///     opts.should_process_lazily = true;
///     opts.case_insensitive = true;
/// });
/// let xml = hash.parse("<Root><Item>1</Item></Root>");
/// assert!(xml.by_key("root").by_key("item").is_ok());
/// ```
pub fn config(configure: impl FnOnce(&mut ParserOptions)) -> XmlHash {
    let mut options = ParserOptions::default();
    configure(&mut options);
    XmlHash::new(options)
}

/// Parse the whole document with default options
pub fn parse(input: impl AsRef<[u8]>) -> XmlIndexer {
    XmlHash::default().parse(input)
}

/// Lazy handle over the document with default options
pub fn lazy(input: impl AsRef<[u8]>) -> XmlIndexer {
    XmlHash::default().parse_lazily(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points() {
        let input = "<a><b>x</b></a>";
        assert!(matches!(parse(input), XmlIndexer::Element(_)));
        assert!(matches!(lazy(input), XmlIndexer::Stream(_)));

        let hash = config(|opts| opts.should_process_lazily = true);
        assert!(matches!(hash.parse(input), XmlIndexer::Stream(_)));
        assert!(matches!(hash.parse(input.as_bytes().to_vec()), XmlIndexer::Stream(_)));
    }

    #[test]
    fn test_user_info_is_carried() {
        let hash = config(|opts| {
            opts.user_info.insert("source".into(), "feed".into());
        });
        assert_eq!(hash.options().user_info.get("source").map(String::as_str), Some("feed"));
    }

    #[test]
    fn test_lazy_encoding_error_is_immediate() {
        let hash = config(|opts| opts.encoding = Encoding::Ascii);
        assert!(matches!(
            hash.parse_lazily(b"<a>\xFF</a>"),
            XmlIndexer::ParsingError(DocumentError::InvalidEncoding { .. })
        ));
    }
}
