//! XML Event Types
//!
//! Events produced by the [`SliceReader`](super::SliceReader). Only the
//! constructs that contribute to the element tree are surfaced; comments,
//! processing instructions, the XML declaration and DOCTYPE are consumed by
//! the reader.

use std::borrow::Cow;

/// XML parsing event
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(EndElement<'a>),
    /// Text content between tags, entities decoded
    Text(Cow<'a, str>),
    /// CDATA section content, verbatim
    CData(Cow<'a, str>),
}

/// Start element event data
#[derive(Debug, Clone, PartialEq)]
pub struct StartElement<'a> {
    /// Reported element name: the qualified name, or the local name when
    /// namespace processing is on
    pub name: Cow<'a, str>,
    /// Resolved namespace URI (namespace processing only)
    pub namespace: Option<String>,
    /// Attributes in document order, duplicates included
    pub attributes: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}

/// End element event data
#[derive(Debug, Clone, PartialEq)]
pub struct EndElement<'a> {
    pub name: Cow<'a, str>,
}

/// Borrowed bytes to `str`, borrowing when the bytes are valid UTF-8
pub(crate) fn bytes_to_str(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Decoded bytes to `str`, keeping the borrow when there is one
pub(crate) fn cow_to_str(bytes: Cow<'_, [u8]>) -> Cow<'_, str> {
    match bytes {
        Cow::Borrowed(b) => String::from_utf8_lossy(b),
        Cow::Owned(v) => match String::from_utf8(v) {
            Ok(s) => Cow::Owned(s),
            Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cow_to_str_keeps_borrow() {
        let s = cow_to_str(Cow::Borrowed(b"plain"));
        assert!(matches!(s, Cow::Borrowed("plain")));
        let s = cow_to_str(Cow::Owned(b"a & b".to_vec()));
        assert_eq!(s, "a & b");
    }
}
