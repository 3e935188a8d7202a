//! Markup Tokenizer - pull-style state machine over the raw input
//!
//! Extracts:
//! - Element start/end/empty tags
//! - Text content (entities decoded)
//! - CDATA sections
//! - Comments, processing instructions, XML declaration and DOCTYPE
//!
//! The tokenizer never guesses its way past a construct it cannot close.
//! The first such failure is recorded as a [`ParseError`] and the token
//! stream ends there; whether that failure is reported to the caller is a
//! policy decision made by whoever consumes the stream.

use super::entities::decode_text;
use super::scanner::{is_whitespace, Scanner};
use std::borrow::Cow;

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Between tags
    InsideText,
    /// Inside a markup construct (<...>)
    InsideMarkup,
    /// End of input reached, or a fatal error was recorded
    Done,
}

/// Type of token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// <element>
    StartTag,
    /// </element>
    EndTag,
    /// <element/>
    EmptyTag,
    Text,
    /// <![CDATA[...]]>
    CData,
    /// <!--...-->
    Comment,
    /// <?target ...?>
    ProcessingInstruction,
    /// <?xml ...?>
    XmlDeclaration,
    DocType,
    Eof,
}

/// A token with its raw span in the input
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags and PIs: the name or target
    pub name: Option<&'a [u8]>,
    /// For text, CDATA, comments and PI data
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// A fatal scan failure: where the tokenizer gave up and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the input
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

/// Markup tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    state: ParseState,
    error: Option<ParseError>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            state: ParseState::InsideText,
            error: None,
        }
    }

    /// The fatal error that stopped the stream, if any
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Record a fatal error at `position` and stop the stream.
    ///
    /// Only the first error is kept. Also used by the event reader for
    /// structural failures (mismatched end tags) detected above this layer.
    pub fn fail_at(&mut self, message: impl Into<String>, position: usize) {
        if self.error.is_none() {
            let (line, column) = self.scanner.line_column(position);
            self.error = Some(ParseError {
                message: message.into(),
                position,
                line,
                column,
            });
        }
        self.state = ParseState::Done;
    }

    fn fail(&mut self, message: &str, position: usize) -> Option<Token<'a>> {
        self.fail_at(message, position);
        None
    }

    /// Get the next token, or None once the stream has ended
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.state == ParseState::Done {
            return None;
        }

        match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            Some(_) => self.parse_text(),
            None => {
                self.state = ParseState::Done;
                let end = self.scanner.position();
                Some(Token::new(TokenKind::Eof, (end, end)))
            }
        }
    }

    /// Text runs up to the next '<' (or end of input)
    fn parse_text(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_byte(b'<')
            .unwrap_or(start + self.scanner.remaining().len());
        let raw = self.scanner.slice(start, end);
        self.scanner.set_position(end);
        Some(Token::new(TokenKind::Text, (start, end)).with_content(decode_text(raw)))
    }

    /// Markup starting with '<'
    fn parse_markup(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        self.scanner.advance(1);
        self.state = ParseState::InsideMarkup;

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => self.fail("unexpected end of input after '<'", start),
        }
    }

    /// Start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Option<Token<'a>> {
        let Some(name) = self.scanner.read_name() else {
            let at = self.scanner.position();
            return self.fail("invalid element name", at);
        };

        let Some(end) = self.scanner.find_tag_end_quoted() else {
            return self.fail("unterminated start tag", start);
        };

        let is_empty = end > start && self.scanner.slice(end - 1, end) == b"/";
        self.scanner.set_position(end + 1);
        self.state = ParseState::InsideText;

        let kind = if is_empty {
            TokenKind::EmptyTag
        } else {
            TokenKind::StartTag
        };
        Some(Token::new(kind, (start, end + 1)).with_name(name))
    }

    fn parse_end_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1);

        let Some(name) = self.scanner.read_name() else {
            let at = self.scanner.position();
            return self.fail("invalid element name in end tag", at);
        };

        let Some(end) = self.scanner.find_byte(b'>') else {
            return self.fail("unterminated end tag", start);
        };
        if !self
            .scanner
            .slice(self.scanner.position(), end)
            .iter()
            .all(|&b| is_whitespace(b))
        {
            let at = self.scanner.position();
            return self.fail("unexpected content in end tag", at);
        }

        self.scanner.set_position(end + 1);
        self.state = ParseState::InsideText;
        Some(Token::new(TokenKind::EndTag, (start, end + 1)).with_name(name))
    }

    /// Markup starting with '<!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1);

        if self.scanner.starts_with(b"--") {
            self.parse_delimited(start, 2, b"-->", TokenKind::Comment, "unterminated comment")
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_delimited(start, 7, b"]]>", TokenKind::CData, "unterminated CDATA section")
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            self.fail("unknown markup declaration", start)
        }
    }

    /// Comment or CDATA: skip the opener, then take everything up to `terminator`
    fn parse_delimited(
        &mut self,
        start: usize,
        opener_len: usize,
        terminator: &[u8],
        kind: TokenKind,
        unterminated: &str,
    ) -> Option<Token<'a>> {
        self.scanner.advance(opener_len);
        let content_start = self.scanner.position();

        let Some(end) = self.scanner.find_sequence(terminator) else {
            return self.fail(unterminated, start);
        };

        let content = self.scanner.slice(content_start, end);
        self.scanner.set_position(end + terminator.len());
        self.state = ParseState::InsideText;
        Some(
            Token::new(kind, (start, self.scanner.position()))
                .with_content(Cow::Borrowed(content)),
        )
    }

    /// DOCTYPE, including an optional bracketed internal subset
    fn parse_doctype(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(7);
        let body_start = self.scanner.position();

        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        let mut close = None;
        for (i, &b) in self.scanner.remaining().iter().enumerate() {
            match (quote, b) {
                (Some(q), _) if q == b => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => {
                    close = Some(body_start + i);
                    break;
                }
                _ => {}
            }
        }

        let Some(end) = close else {
            return self.fail("unterminated DOCTYPE declaration", start);
        };

        let content = self.scanner.slice(body_start, end);
        self.scanner.set_position(end + 1);
        self.state = ParseState::InsideText;
        Some(Token::new(TokenKind::DocType, (start, end + 1)).with_content(Cow::Borrowed(content)))
    }

    /// Processing instruction or XML declaration
    fn parse_pi(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1);

        let Some(target) = self.scanner.read_name() else {
            let at = self.scanner.position();
            return self.fail("invalid processing instruction target", at);
        };
        let data_start = self.scanner.position();

        let Some(end) = self.scanner.find_sequence(b"?>") else {
            return self.fail("unterminated processing instruction", start);
        };

        let data = self.scanner.slice(data_start, end);
        self.scanner.set_position(end + 2);
        self.state = ParseState::InsideText;

        let kind = if target.eq_ignore_ascii_case(b"xml") {
            TokenKind::XmlDeclaration
        } else {
            TokenKind::ProcessingInstruction
        };
        let trimmed = trim_leading_whitespace(data);
        Some(
            Token::new(kind, (start, self.scanner.position()))
                .with_name(target)
                .with_content(Cow::Borrowed(trimmed)),
        )
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|&&b| is_whitespace(b)).count();
    bytes.get(skip..).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            kinds(b"<root>hello</root>"),
            vec![TokenKind::StartTag, TokenKind::Text, TokenKind::EndTag]
        );
    }

    #[test]
    fn test_empty_element() {
        let tokens: Vec<_> = Tokenizer::new(b"<br/>").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EmptyTag);
        assert_eq!(tokens[0].name, Some(b"br" as &[u8]));
    }

    #[test]
    fn test_whitespace_text_is_kept() {
        assert_eq!(
            kinds(b"<a> <b/>\n</a>"),
            vec![
                TokenKind::StartTag,
                TokenKind::Text,
                TokenKind::EmptyTag,
                TokenKind::Text,
                TokenKind::EndTag
            ]
        );
    }

    #[test]
    fn test_cdata_and_comment() {
        let tokens: Vec<_> = Tokenizer::new(b"<s><![CDATA[a<b]]><!-- x --></s>").collect();
        assert_eq!(tokens[1].kind, TokenKind::CData);
        assert_eq!(tokens[1].content.as_deref(), Some(b"a<b" as &[u8]));
        assert_eq!(tokens[2].kind, TokenKind::Comment);
    }

    #[test]
    fn test_declaration_and_doctype() {
        assert_eq!(
            kinds(b"<?xml version=\"1.0\"?><!DOCTYPE r [<!ENTITY e \"x\">]><r/>"),
            vec![TokenKind::XmlDeclaration, TokenKind::DocType, TokenKind::EmptyTag]
        );
    }

    #[test]
    fn test_entities_decoded_in_text() {
        let tokens: Vec<_> = Tokenizer::new(b"<a>x &amp; y</a>").collect();
        assert_eq!(tokens[1].content.as_deref(), Some(b"x & y" as &[u8]));
    }

    #[test]
    fn test_unterminated_tag_is_fatal() {
        let mut tokenizer = Tokenizer::new(b"<a>\n<b attr=\"1\"");
        let tokens: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(tokens.len(), 2);
        let error = tokenizer.error().unwrap();
        assert_eq!((error.line, error.column), (2, 1));
        // the stream stays ended
        assert!(tokenizer.next_token().is_none());
    }

    #[test]
    fn test_invalid_name_is_fatal() {
        let mut tokenizer = Tokenizer::new(b"<a><1/></a>");
        let tokens: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(tokens.len(), 1);
        assert!(tokenizer.error().is_some());
    }
}
