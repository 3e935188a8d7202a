//! Input encoding detection and conversion
//!
//! Everything downstream of this module works on UTF-8. Input in another
//! encoding is converted once, up front; input that cannot be decoded under
//! the requested encoding is rejected with
//! [`DocumentError::InvalidEncoding`].

use crate::error::DocumentError;
use crate::options::Encoding;
use std::borrow::Cow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Detect the encoding of the input from its byte order mark or leading bytes
pub fn detect(input: &[u8]) -> Encoding {
    match input {
        [0xFF, 0xFE, ..] => Encoding::Utf16Le,
        [0xFE, 0xFF, ..] => Encoding::Utf16Be,
        // No BOM - '<' next to a NUL byte means UTF-16
        [0x00, b'<', ..] => Encoding::Utf16Be,
        [b'<', 0x00, ..] => Encoding::Utf16Le,
        _ => Encoding::Utf8,
    }
}

/// Convert the input to UTF-8 under the requested encoding
pub fn to_utf8(input: &[u8], encoding: Encoding) -> Result<Cow<'_, [u8]>, DocumentError> {
    let encoding = match encoding {
        Encoding::Auto => detect(input),
        other => other,
    };

    match encoding {
        Encoding::Auto | Encoding::Utf8 => {
            let bytes = input.strip_prefix(UTF8_BOM).unwrap_or(input);
            std::str::from_utf8(bytes).map_err(|e| invalid(encoding, e.to_string()))?;
            Ok(Cow::Borrowed(bytes))
        }
        Encoding::Utf16Le => utf16_to_utf8(input, UTF16_LE_BOM, u16::from_le_bytes, encoding),
        Encoding::Utf16Be => utf16_to_utf8(input, UTF16_BE_BOM, u16::from_be_bytes, encoding),
        Encoding::Latin1 => {
            if input.is_ascii() {
                return Ok(Cow::Borrowed(input));
            }
            let text: String = input.iter().map(|&b| char::from(b)).collect();
            Ok(Cow::Owned(text.into_bytes()))
        }
        Encoding::Ascii => match input.iter().position(|b| !b.is_ascii()) {
            None => Ok(Cow::Borrowed(input)),
            Some(at) => Err(invalid(encoding, format!("non-ASCII byte at offset {at}"))),
        },
    }
}

fn utf16_to_utf8(
    input: &[u8],
    bom: &[u8],
    unit: fn([u8; 2]) -> u16,
    encoding: Encoding,
) -> Result<Cow<'static, [u8]>, DocumentError> {
    let bytes = input.strip_prefix(bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(invalid(encoding, "odd number of bytes".to_string()));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map(|s| Cow::Owned(s.into_bytes()))
        .map_err(|e| invalid(encoding, e.to_string()))
}

fn invalid(encoding: Encoding, message: String) -> DocumentError {
    DocumentError::InvalidEncoding { encoding, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(detect(b"<root/>"), Encoding::Utf8);
        assert_eq!(detect(&[0xEF, 0xBB, 0xBF, b'<']), Encoding::Utf8);
        assert_eq!(detect(&[0xFF, 0xFE, b'<', 0x00]), Encoding::Utf16Le);
        assert_eq!(detect(&[0x00, b'<', 0x00, b'r']), Encoding::Utf16Be);
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let out = to_utf8(&[0xEF, 0xBB, 0xBF, b'<', b'r', b'/', b'>'], Encoding::Auto).unwrap();
        assert_eq!(out.as_ref(), b"<r/>");
    }

    #[test]
    fn test_convert_utf16_le() {
        let utf16_le = [0xFF, 0xFE, b'<', 0x00, b'r', 0x00, b'/', 0x00, b'>', 0x00];
        assert_eq!(to_utf8(&utf16_le, Encoding::Auto).unwrap().as_ref(), b"<r/>");
    }

    #[test]
    fn test_convert_utf16_be_declared() {
        let utf16_be = [0x00, b'<', 0x00, b'r', 0x00, b'/', 0x00, b'>'];
        assert_eq!(to_utf8(&utf16_be, Encoding::Utf16Be).unwrap().as_ref(), b"<r/>");
    }

    #[test]
    fn test_latin1() {
        let out = to_utf8(b"<a>caf\xE9</a>", Encoding::Latin1).unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "<a>café</a>");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            to_utf8(b"<a>\xFF</a>", Encoding::Utf8),
            Err(DocumentError::InvalidEncoding { encoding: Encoding::Utf8, .. })
        ));
        assert!(to_utf8(b"<a>\xE9</a>", Encoding::Ascii).is_err());
        assert!(to_utf8(&[0xFF, 0xFE, b'<'], Encoding::Auto).is_err());
    }
}
