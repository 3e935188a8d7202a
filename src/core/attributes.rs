//! Attribute parsing
//!
//! Parses the attribute run of a start tag (the bytes between the element
//! name and `>` / `/>`). Parsing is permissive: unquoted values and
//! value-less attributes are accepted, stray bytes are skipped.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: &'a [u8],
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute { name, value }
    }

    /// Namespace prefix and local name, split at the first colon
    pub fn split_name(&self) -> (Option<&'a [u8]>, &'a [u8]) {
        split_name(self.name)
    }
}

/// Split a qualified name into prefix and local name at the colon
pub fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    match memchr(b':', name) {
        Some(pos) => (name.get(..pos), name.get(pos + 1..).unwrap_or_default()),
        None => (None, name),
    }
}

/// Parse attributes from raw tag content (after the element name).
///
/// Duplicates are returned as written; collapsing them is the document
/// model's job.
pub fn parse_attributes(input: &[u8]) -> Vec<Attribute<'_>> {
    let mut attrs = Vec::new();
    let mut pos = 0;

    let skip_ws = |mut pos: usize| {
        while input.get(pos).is_some_and(|&b| is_whitespace(b)) {
            pos += 1;
        }
        pos
    };

    loop {
        pos = skip_ws(pos);
        let Some(&first) = input.get(pos) else { break };

        if first == b'/' || first == b'>' {
            break;
        }
        if !is_name_start_char(first) {
            pos += 1;
            continue;
        }

        let name_start = pos;
        while input.get(pos).is_some_and(|&b| is_name_char(b)) {
            pos += 1;
        }
        let name = input.get(name_start..pos).unwrap_or_default();

        pos = skip_ws(pos);
        if input.get(pos) != Some(&b'=') {
            // Attribute without value (like HTML boolean attributes)
            attrs.push(Attribute::new(name, Cow::Borrowed(b"")));
            continue;
        }
        pos = skip_ws(pos + 1);

        let value_bytes = match input.get(pos) {
            None => {
                attrs.push(Attribute::new(name, Cow::Borrowed(b"")));
                break;
            }
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = pos + 1;
                let value_end = input
                    .get(value_start..)
                    .and_then(|rest| memchr(quote, rest))
                    .map_or(input.len(), |i| value_start + i);
                pos = value_end + 1;
                input.get(value_start..value_end).unwrap_or_default()
            }
            Some(_) => {
                // Unquoted value (non-standard but handle it)
                let value_start = pos;
                while input
                    .get(pos)
                    .is_some_and(|&b| !is_whitespace(b) && b != b'/' && b != b'>')
                {
                    pos += 1;
                }
                input.get(value_start..pos).unwrap_or_default()
            }
        };

        attrs.push(Attribute::new(name, decode_text(value_bytes)));
    }

    attrs
}
