//! Byte scanner for markup delimiters
//!
//! Thin cursor over the input buffer. Delimiter searches go through `memchr`
//! so the tokenizer spends its time on structure, not on byte loops.

use memchr::{memchr, memchr_iter};

/// Cursor over the raw input
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Bytes from the cursor to the end of input
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Slice of the input between two absolute offsets (empty when out of range)
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        self.input.get(start..end).unwrap_or_default()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_position(self.pos + n);
    }

    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Absolute offset of the next occurrence of `byte`
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.remaining()).map(|i| self.pos + i)
    }

    /// Absolute offset of the next occurrence of a multi-byte terminator
    pub fn find_sequence(&self, needle: &[u8]) -> Option<usize> {
        let first = *needle.first()?;
        let haystack = self.remaining();
        memchr_iter(first, haystack)
            .find(|&i| haystack.get(i..).is_some_and(|rest| rest.starts_with(needle)))
            .map(|i| self.pos + i)
    }

    /// Find the closing '>' of a tag, ignoring any '>' inside quoted values
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut quote: Option<u8> = None;
        for (i, &b) in self.remaining().iter().enumerate() {
            match (quote, b) {
                (None, b'"' | b'\'') => quote = Some(b),
                (Some(q), _) if q == b => quote = None,
                (None, b'>') => return Some(self.pos + i),
                _ => {}
            }
        }
        None
    }

    /// Read a tag or attribute name starting at the cursor
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        if !is_name_start_char(self.peek()?) {
            return None;
        }
        let len = self
            .remaining()
            .iter()
            .position(|&b| !is_name_char(b))
            .unwrap_or(self.remaining().len());
        self.advance(len);
        Some(self.slice(start, self.pos))
    }

    /// 1-based (line, column) for an absolute offset.
    ///
    /// Columns count bytes, matching what a byte-oriented tokenizer can report.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let prefix = self.slice(0, offset.min(self.input.len()));
        let line = memchr_iter(b'\n', prefix).count() + 1;
        let line_start = memchr::memrchr(b'\n', prefix).map_or(0, |i| i + 1);
        (line, prefix.len() - line_start + 1)
    }
}

/// Check if byte may start an element or attribute name
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
pub fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_end_quoted() {
        let scanner = Scanner::new(b"<a attr=\">test\">content");
        assert_eq!(scanner.find_tag_end_quoted(), Some(15));
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(b"element-name>");
        assert_eq!(scanner.read_name(), Some(b"element-name" as &[u8]));
        assert_eq!(scanner.position(), 12);
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut scanner = Scanner::new(b"1abc");
        assert_eq!(scanner.read_name(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_find_sequence() {
        let scanner = Scanner::new(b"a - b -- c -->");
        assert_eq!(scanner.find_sequence(b"-->"), Some(11));
        assert_eq!(scanner.find_sequence(b"]]>"), None);
    }

    #[test]
    fn test_line_column() {
        let scanner = Scanner::new(b"<a>\n  <b>\n</a>");
        assert_eq!(scanner.line_column(0), (1, 1));
        assert_eq!(scanner.line_column(6), (2, 3));
        assert_eq!(scanner.line_column(10), (3, 1));
    }
}
