//! Zero-Copy Slice Reader
//!
//! Turns the tokenizer's token stream into [`XmlEvent`]s over a byte slice.
//! On top of the tokenizer it enforces element nesting: an end tag that does
//! not close the innermost open element, or input that ends with elements
//! still open, is a fatal error recorded on the tokenizer. Names and text
//! borrow from the input whenever no decoding was needed.

use super::events::{bytes_to_str, cow_to_str, EndElement, StartElement, XmlEvent};
use super::namespace::NamespaceResolver;
use crate::core::attributes::{parse_attributes, split_name};
use crate::core::tokenizer::{ParseError, Token, TokenKind, Tokenizer};

/// Event reader over a byte slice
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
    /// Qualified names of the currently open elements
    open: Vec<&'a [u8]>,
    /// Present only when namespace processing is on
    namespaces: Option<NamespaceResolver>,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
            open: Vec::new(),
            namespaces: None,
        }
    }

    /// Reader that reports local names and resolves namespace URIs
    pub fn with_namespaces(input: &'a [u8]) -> Self {
        SliceReader {
            namespaces: Some(NamespaceResolver::new()),
            ..Self::new(input)
        }
    }

    /// The fatal error that ended the stream, if any
    pub fn error(&self) -> Option<&ParseError> {
        self.tokenizer.error()
    }

    /// Get the next event, or None once the stream has ended
    pub fn next_event(&mut self) -> Option<XmlEvent<'a>> {
        loop {
            let token = self.tokenizer.next_token()?;

            match token.kind {
                TokenKind::Eof => {
                    if let Some(name) = self.open.last() {
                        let message = format!("unclosed element <{}>", bytes_to_str(name));
                        self.tokenizer.fail_at(message, token.span.0);
                    }
                    return None;
                }

                TokenKind::StartTag => {
                    let name = token.name?;
                    let start = self.start_element(&token, name);
                    self.open.push(name);
                    return Some(XmlEvent::StartElement(start));
                }

                TokenKind::EmptyTag => {
                    let name = token.name?;
                    let start = self.start_element(&token, name);
                    if let Some(ns) = self.namespaces.as_mut() {
                        ns.pop_scope();
                    }
                    return Some(XmlEvent::EmptyElement(start));
                }

                TokenKind::EndTag => {
                    let name = token.name?;
                    return self.end_element(&token, name);
                }

                TokenKind::Text => {
                    if let Some(content) = token.content {
                        if !content.is_empty() {
                            return Some(XmlEvent::Text(cow_to_str(content)));
                        }
                    }
                }

                TokenKind::CData => {
                    if let Some(content) = token.content {
                        return Some(XmlEvent::CData(cow_to_str(content)));
                    }
                }

                TokenKind::Comment
                | TokenKind::ProcessingInstruction
                | TokenKind::XmlDeclaration
                | TokenKind::DocType => {}
            }
        }
    }

    fn start_element(&mut self, token: &Token<'a>, name: &'a [u8]) -> StartElement<'a> {
        let attributes = parse_attributes(self.attribute_run(token, name));

        let Some(resolver) = self.namespaces.as_mut() else {
            return StartElement {
                name: bytes_to_str(name),
                namespace: None,
                attributes: attributes
                    .into_iter()
                    .map(|a| (bytes_to_str(a.name), cow_to_str(a.value)))
                    .collect(),
            };
        };

        resolver.push_scope();
        let mut kept = Vec::with_capacity(attributes.len());
        for attr in attributes {
            match attr.split_name() {
                (None, b"xmlns") => resolver.declare(None, &cow_to_str(attr.value)),
                (Some(b"xmlns"), prefix) => {
                    resolver.declare(Some(bytes_to_str(prefix).as_ref()), &cow_to_str(attr.value))
                }
                _ => kept.push((bytes_to_str(attr.name), cow_to_str(attr.value))),
            }
        }

        let (prefix, local) = split_name(name);
        let prefix = prefix.map(bytes_to_str);
        StartElement {
            name: bytes_to_str(local),
            namespace: resolver.resolve(prefix.as_deref()).map(str::to_string),
            attributes: kept,
        }
    }

    fn end_element(&mut self, token: &Token<'a>, name: &'a [u8]) -> Option<XmlEvent<'a>> {
        match self.open.last() {
            Some(&open) if open == name => {
                self.open.pop();
            }
            Some(&open) => {
                let message = format!(
                    "mismatched end tag: expected </{}>, found </{}>",
                    bytes_to_str(open),
                    bytes_to_str(name)
                );
                self.tokenizer.fail_at(message, token.span.0);
                return None;
            }
            None => {
                let message = format!("unexpected end tag </{}>", bytes_to_str(name));
                self.tokenizer.fail_at(message, token.span.0);
                return None;
            }
        }

        let reported = match self.namespaces.as_mut() {
            Some(ns) => {
                ns.pop_scope();
                split_name(name).1
            }
            None => name,
        };
        Some(XmlEvent::EndElement(EndElement {
            name: bytes_to_str(reported),
        }))
    }

    /// Bytes between the element name and the closing `>` / `/>`
    fn attribute_run(&self, token: &Token<'a>, name: &[u8]) -> &'a [u8] {
        let (start, end) = token.span;
        let from = start + 1 + name.len();
        let to = end.saturating_sub(1);
        self.input.get(from..to).unwrap_or_default()
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}
