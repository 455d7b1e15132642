//! Text wire form shared by hashes and event bodies.
//!
//! base64url alphabet, `=` padding stripped on encode and restored to the
//! next multiple of four on decode.

use crate::error::{CoreError, CoreResult};
use base64::Engine as _;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

/// Restore `=` padding so the length is a multiple of four
#[must_use]
pub fn pad(s: &str) -> String {
    let missing = (4 - s.len() % 4) % 4;
    let mut out = String::with_capacity(s.len() + missing);
    out.push_str(s);
    out.extend(std::iter::repeat_n('=', missing));
    out
}

/// Encode bytes as unpadded base64url
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded (or padded) base64url text
///
/// # Errors
///
/// Returns [`CoreError::Decode`] if the text is not valid base64url
pub fn decode(s: &str) -> CoreResult<Vec<u8>> {
    URL_SAFE
        .decode(pad(s))
        .map_err(|err| CoreError::decode(format!("invalid base64url text: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pad() {
        assert_eq!(pad(""), "");
        assert_eq!(pad("ab"), "ab==");
        assert_eq!(pad("abc"), "abc=");
        assert_eq!(pad("abcd"), "abcd");
    }

    #[test]
    fn test_encode_uses_url_alphabet_without_padding() {
        let s = encode(&[0xfb, 0xff]);
        assert_eq!(s, "-_8");
        assert!(!s.contains('='));
    }

    #[test]
    fn test_decode_accepts_padded_and_unpadded() {
        assert_eq!(decode("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode("-_8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_decode_rejects_standard_alphabet() {
        assert!(matches!(decode("+/8"), Err(CoreError::Decode { .. })));
    }

    #[test]
    fn test_decode_rejects_impossible_length() {
        assert!(matches!(decode("abcde"), Err(CoreError::Decode { .. })));
    }

    proptest! {
        #[test]
        fn prop_text_roundtrip(bytes: Vec<u8>) {
            let text = encode(&bytes);
            prop_assert!(!text.contains('='));
            prop_assert_eq!(decode(&text).unwrap(), bytes);
        }
    }
}
