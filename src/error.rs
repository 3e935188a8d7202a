//! Error types
//!
//! Two families travel through the [`XmlIndexer`](crate::XmlIndexer) channel:
//! structural lookup failures ([`IndexingError`]) produced while chaining
//! queries, and document-level failures ([`DocumentError`]) reported once,
//! at parse entry.

use crate::options::Encoding;
use thiserror::Error;

/// A key, index or attribute lookup that found nothing
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum IndexingError {
    #[error("XML Element Error: Incorrect key [\"{key}\"]")]
    KeyNotFound { key: String },

    #[error("XML Element Error: Incorrect index [\"{index}\"]")]
    IndexOutOfRange { index: usize },

    #[error("XML Attribute Error: Missing attribute [\"{name}\"]")]
    AttributeMissing { name: String },

    #[error("XML Attribute Error: Missing attribute [\"{name}\"] with value [\"{value}\"]")]
    AttributeValueMismatch { name: String, value: String },
}

/// Failure of the document as a whole
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DocumentError {
    /// Fatal scan failure; only surfaced when strict detection is enabled
    #[error("malformed XML at line {line}, column {column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("input is not valid {encoding:?}: {message}")]
    InvalidEncoding { encoding: Encoding, message: String },
}

/// Either error family, for callers that want a single `?`-able type
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Indexing(#[from] IndexingError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

pub type Result<T> = std::result::Result<T, Error>;
