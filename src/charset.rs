//! Character encodings understood by the capture decoders.
//!
//! Labels resolve through [`encoding_rs`] using the WHATWG label table, so a
//! declared `charset` works as long as a browser would accept it:
//! - `UTF-8`, `UTF-16LE`/`UTF-16BE` and the legacy single-byte sets
//!   (`ISO-8859-*`, `windows-125*`, `KOI8-R`, ...)
//! - the CJK multi-byte sets (`Shift_JIS`, `EUC-JP`, `GBK`, `gb18030`, `Big5`, `EUC-KR`)
//!
//! Following WHATWG, `ISO-8859-1`, `latin1` and `US-ASCII` all decode as
//! `windows-1252`, and a bare `UTF-16` means little endian unless a BOM says otherwise.

use encoding_rs::{Encoding, UTF_8};

/// Placeholder returned when the declared charset is not one we can decode.
pub const UNSUPPORTED_ENCODING: &str = "[UNSUPPORTED ENCODING]";

/// Resolves a declared charset label such as `UTF-8` or `"Shift_JIS"`.
///
/// Unknown labels give `None`. So do the labels WHATWG maps to its
/// `replacement` encoding (`ISO-2022-KR`, `HZ-GB-2312`, ...), which would turn
/// any body into a single U+FFFD.
pub fn encoding_for(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label_no_replacement(label.trim().trim_matches('"').as_bytes())
}

/// Decodes `bytes` using `label`, or UTF-8 when no label was declared.
///
/// A byte order mark overrides the label. Malformed sequences become U+FFFD.
pub fn decode(bytes: &[u8], label: Option<&str>) -> String {
    let encoding = match label {
        None => UTF_8,
        Some(label) => match encoding_for(label) {
            Some(encoding) => encoding,
            None => return UNSUPPORTED_ENCODING.to_string(),
        },
    };
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Extracts the `charset` parameter of a `Content-Type` value.
pub fn charset_of(content_type: &str) -> Option<String> {
    let mime: mime::Mime = content_type.parse().ok()?;
    mime.get_param(mime::CHARSET).map(|name| name.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{SHIFT_JIS, UTF_16LE, WINDOWS_1252};

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(encoding_for("UTF-8"), Some(UTF_8));
        assert_eq!(encoding_for(" Latin1 "), Some(WINDOWS_1252));
        assert_eq!(encoding_for("\"utf-16le\""), Some(UTF_16LE));
        assert_eq!(encoding_for("SHIFT_JIS"), Some(SHIFT_JIS));
        assert_eq!(encoding_for("klingon"), None);
    }

    #[test]
    fn test_replacement_labels_are_unsupported() {
        assert_eq!(encoding_for("ISO-2022-KR"), None);
        assert_eq!(decode(b"abc", Some("iso-2022-kr")), UNSUPPORTED_ENCODING);
    }

    #[test]
    fn test_unknown_charset_degrades_to_sentinel() {
        assert_eq!(decode(b"abc", Some("x-unknown")), UNSUPPORTED_ENCODING);
    }

    #[test]
    fn test_default_is_utf8() {
        assert_eq!(decode("héllo".as_bytes(), None), "héllo");
    }

    #[test]
    fn test_legacy_single_byte_sets() {
        let cafe = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode(&cafe, Some("windows-1252")), "café");
        assert_eq!(decode(&cafe, Some("ISO-8859-1")), "café");
        assert_eq!(decode(&cafe, Some("US-ASCII")), "café");
        assert_eq!(decode(&[0x80], Some("windows-1252")), "€");
    }

    #[test]
    fn test_multi_byte_sets() {
        assert_eq!(decode(&[0x93, 0xFA, 0x96, 0x7B], Some("Shift_JIS")), "日本");
    }

    #[test]
    fn test_utf16_byte_order() {
        assert_eq!(decode(&[0xFF, 0xFE, b'h', 0, b'i', 0], Some("UTF-16")), "hi");
        assert_eq!(decode(&[0xFE, 0xFF, 0, b'h', 0, b'i'], Some("UTF-16")), "hi");
        assert_eq!(decode(&[b'h', 0, b'i', 0], Some("UTF-16")), "hi");
        assert_eq!(decode(&[0, b'h', 0, b'i'], Some("UTF-16BE")), "hi");
        assert_eq!(decode(&[b'h', 0, b'i'], Some("UTF-16LE")), "h\u{FFFD}");
    }

    #[test]
    fn test_malformed_utf8_is_lossy() {
        assert_eq!(decode(&[b'o', b'k', 0xFF], Some("utf-8")), "ok\u{FFFD}");
    }

    #[test]
    fn test_charset_parameter() {
        let charset = charset_of("text/plain; charset=ISO-8859-1").unwrap();
        assert!(charset.eq_ignore_ascii_case("iso-8859-1"));
        assert_eq!(charset_of("application/json"), None);
        assert_eq!(charset_of("not a mime"), None);
    }
}
