//! DOM Module - owned element tree
//!
//! - Element: name, ordered children, last-wins attribute map
//! - Root sentinel wrapping all top-level content
//! - Display-based markup serialization

pub mod node;
pub mod serialize;

pub use node::{Element, TextElement, XmlAttribute, XmlContent, ROOT_ELEMENT_NAME};
