//! Payload encoding for the transport's string-only channel.
//!
//! Outbound payloads are percent-encoded before crossing the boundary and
//! inbound messages are percent-decoded on arrival. The transport never sees
//! raw application text.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use crate::error::{Error, Result};

// ============================================================================
// Encoding
// ============================================================================

/// Percent-encodes an outbound payload.
#[inline]
#[must_use]
pub fn encode_payload(data: &str) -> Cow<'_, str> {
    urlencoding::encode(data)
}

/// Percent-decodes an inbound payload.
///
/// # Errors
///
/// Returns [`Error::Decode`] if an escape is not `%` followed by two hex
/// digits, or if the escapes do not decode to valid UTF-8.
pub fn decode_payload(encoded: &str) -> Result<Cow<'_, str>> {
    validate_escapes(encoded)?;
    urlencoding::decode(encoded).map_err(|e| Error::decode(format!("{e} in '{encoded}'")))
}

/// Rejects `%` not followed by exactly two hex digits.
fn validate_escapes(encoded: &str) -> Result<()> {
    let bytes = encoded.as_bytes();

    for (index, _) in encoded.match_indices('%') {
        let valid = bytes
            .get(index + 1..index + 3)
            .is_some_and(|digits| digits.iter().all(u8::is_ascii_hexdigit));

        if !valid {
            return Err(Error::decode(format!(
                "malformed escape at byte {index} in '{encoded}'"
            )));
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode_payload("a b&c=d"), "a%20b%26c%3Dd");
    }

    #[test]
    fn test_encode_passthrough() {
        assert!(matches!(encode_payload("plain-text_1.0~"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_multibyte() {
        let decoded = decode_payload("caf%C3%A9%20%E2%9C%93").expect("decode");
        assert_eq!(decoded, "café ✓");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_payload("%FF%FE").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_decode_malformed_escapes() {
        for malformed in ["%ZZ", "50%", "%4", "ok%2", "%%41", "a%G1b"] {
            let err = decode_payload(malformed).unwrap_err();
            assert!(matches!(err, Error::Decode { .. }), "accepted {malformed:?}");
        }
    }

    #[test]
    fn test_decode_escaped_percent() {
        assert_eq!(decode_payload("100%25%20sure").expect("decode"), "100% sure");
    }

    #[test]
    fn test_unicode_survives_encoding() {
        let original = "héllo, wörld 👋";
        let encoded = encode_payload(original);
        assert!(encoded.is_ascii());
        assert_eq!(decode_payload(&encoded).expect("decode"), original);
    }
}
