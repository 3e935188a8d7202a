//! XML Reader Module
//!
//! - SliceReader: zero-copy event reader with nesting checks
//! - Events: XML event types for pull parsing
//! - Namespace: prefix resolution for namespace-aware reading

pub mod events;
pub mod namespace;
pub mod slice;

pub use events::{EndElement, StartElement, XmlEvent};
pub use slice::SliceReader;
