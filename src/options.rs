//! Parser configuration

use std::collections::HashMap;

/// How the raw input bytes are to be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Detect from the byte order mark or the leading `<`, falling back to UTF-8
    #[default]
    Auto,
    Utf8,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1: every byte is one code point
    Latin1,
    /// 7-bit only; any byte >= 0x80 is an encoding error
    Ascii,
}

/// Options controlling a parse
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Record index operations and materialize only the requested path
    pub should_process_lazily: bool,

    /// Report element names without their prefix and resolve namespace URIs
    pub should_process_namespaces: bool,

    /// Compare element names, attribute names and attribute values ignoring case
    pub case_insensitive: bool,

    pub encoding: Encoding,

    /// Report fatal scan failures instead of returning the partial tree
    pub detect_parsing_errors: bool,

    /// Caller bookkeeping, carried along untouched
    pub user_info: HashMap<String, String>,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Name comparison under the configured case rule.
///
/// Folding is only ever applied for comparison; stored names keep their
/// original spelling.
pub(crate) fn names_match(a: &str, b: &str, case_insensitive: bool) -> bool {
    if !case_insensitive {
        return a == b;
    }
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_eager_and_permissive() {
        let opts = ParserOptions::new();
        assert!(!opts.should_process_lazily);
        assert!(!opts.detect_parsing_errors);
        assert!(!opts.case_insensitive);
        assert_eq!(opts.encoding, Encoding::Auto);
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Foo", "Foo", false));
        assert!(!names_match("Foo", "foo", false));
        assert!(names_match("Foo", "foo", true));
        assert!(names_match("STRASSE", "strasse", true));
        assert!(names_match("Ärger", "ärger", true));
        assert!(!names_match("Foo", "Fo", true));
    }
}
