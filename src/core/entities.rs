//! Entity reference decoding
//!
//! Handles the predefined entities (`&lt;` `&gt;` `&amp;` `&quot;` `&apos;`)
//! and numeric character references (`&#123;` `&#x7B;`). Anything else is
//! left in place verbatim, which is what a permissive reader wants for
//! user-defined entities it has no DTD for.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity references, borrowing when there are none
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = memchr(b'&', rest) {
        let (before, from_amp) = rest.split_at(amp);
        result.extend_from_slice(before);

        let decoded = memchr(b';', from_amp).and_then(|semi| {
            let name = from_amp.get(1..semi)?;
            decode_entity(name).map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                let mut buf = [0u8; 4];
                result.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                rest = from_amp.get(consumed..).unwrap_or_default();
            }
            None => {
                // Unknown or unterminated reference: keep the ampersand
                result.push(b'&');
                rest = from_amp.get(1..).unwrap_or_default();
            }
        }
    }

    result.extend_from_slice(rest);
    result
}

/// Decode a single entity name (without `&` and `;`)
fn decode_entity(entity: &[u8]) -> Option<char> {
    match entity {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => {
            let hex = std::str::from_utf8(hex).ok()?;
            char::from_u32(u32::from_str_radix(hex, 16).ok()?)
        }
        [b'#', dec @ ..] => {
            let dec = std::str::from_utf8(dec).ok()?;
            char::from_u32(dec.parse::<u32>().ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities_borrows() {
        let result = decode_text(b"Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), b"Hello, World!");
    }

    #[test]
    fn test_predefined_entities() {
        let result = decode_text(b"&lt;hello&gt; &amp; &quot;world&quot; &apos;");
        assert_eq!(result.as_ref(), b"<hello> & \"world\" '");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_text(b"&#65;&#x42;&#X43;").as_ref(), b"ABC");
        assert_eq!(
            std::str::from_utf8(decode_text(b"&#x1F600;").as_ref()).unwrap(),
            "😀"
        );
    }

    #[test]
    fn test_unknown_and_bare_ampersand_kept() {
        assert_eq!(decode_text(b"&unknown;").as_ref(), b"&unknown;");
        assert_eq!(decode_text(b"fish & chips").as_ref(), b"fish & chips");
        assert_eq!(decode_text(b"a &#xZZ; b").as_ref(), b"a &#xZZ; b");
    }
}
