//! Core parsing primitives
//!
//! - Scanner: memchr-accelerated delimiter detection
//! - Tokenizer: state machine for token extraction, records fatal failures
//! - Entities: entity decoding with Cow (zero-copy when possible)
//! - Attributes: attribute run parsing
//! - Encoding: BOM detection and conversion to UTF-8

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
