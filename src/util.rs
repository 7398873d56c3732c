//! Text decoding helpers shared by the package parser and the renderer.

use std::borrow::Cow;

use memchr::memmem;

/// Result of decoding raw bytes to text.
///
/// Decoding never fails: unreadable byte sequences are replaced with
/// U+FFFD and `lossy` is set so the caller can decide what to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText<'a> {
    pub text: Cow<'a, str>,
    pub lossy: bool,
}

/// Decode bytes to a string.
///
/// An encoding named in the XML declaration wins when it is not UTF-8.
/// Otherwise the bytes are read as UTF-8 (a BOM selects UTF-8 or UTF-16
/// and is stripped).
pub fn decode_text(bytes: &[u8]) -> DecodedText<'_> {
    let declared = extract_xml_encoding(bytes)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .filter(|enc| *enc != encoding_rs::UTF_8 && *enc != encoding_rs::UTF_16LE && *enc != encoding_rs::UTF_16BE);

    let encoding = declared.unwrap_or(encoding_rs::UTF_8);
    let (text, _used, malformed) = encoding.decode(bytes);
    DecodedText {
        text,
        lossy: malformed,
    }
}

/// Extract the encoding label from an XML declaration.
///
/// Only the first 100 bytes are inspected; `<?xml ... encoding="..."?>`
/// with single or double quotes is recognised.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];
    let decl = &prefix[memmem::find(prefix, b"<?xml")?..];
    let decl = &decl[..memmem::find(decl, b"?>").unwrap_or(decl.len())];

    let enc_pos = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let value = &decl[enc_pos + 9..];

    let quote = *value.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = memchr::memchr(quote, &value[1..])?;
    std::str::from_utf8(&value[1..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_utf8() {
        let decoded = decode_text("<p>日本語</p>".as_bytes());
        assert_eq!(decoded.text, "<p>日本語</p>");
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_decode_invalid_utf8_substitutes_marker() {
        let decoded = decode_text(b"<p>ok \xFF\xFE done</p>");
        assert!(decoded.lossy);
        assert!(decoded.text.contains('\u{FFFD}'));
        assert!(decoded.text.starts_with("<p>ok "));
        assert!(decoded.text.ends_with(" done</p>"));
    }

    #[test]
    fn test_decode_strips_bom() {
        let decoded = decode_text(b"\xEF\xBB\xBFhello");
        assert_eq!(decoded.text, "hello");
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_decode_honours_declared_encoding() {
        let mut bytes = br#"<?xml version="1.0" encoding="windows-1252"?><p>caf"#.to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</p>");
        let decoded = decode_text(&bytes);
        assert!(decoded.text.ends_with("<p>caf\u{e9}</p>"));
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(br#"<?xml version="1.0" encoding="UTF-8"?>"#),
            Some("UTF-8")
        );
        assert_eq!(
            extract_xml_encoding(b"<?xml version='1.0' encoding='iso-8859-1'?>"),
            Some("iso-8859-1")
        );
        assert_eq!(extract_xml_encoding(br#"<?xml version="1.0"?>"#), None);
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
    }
}
