//! Fixed-capacity string fields.
//!
//! Every text field in the interface region is a fixed-size byte run holding
//! a sanitized, NUL-terminated UTF-8 string. Writers overwrite the whole run
//! so no stale tail survives a shorter write; readers take bytes up to the
//! first NUL. Text longer than the field is truncated at a character
//! boundary, never rejected.

/// Byte values that must not reach the display side. Control bytes break the
/// harness status window, `%` and `\` are treated as format escapes by it.
#[inline]
const fn sanitize_byte(byte: u8) -> u8 {
    if byte < 0x20 || byte == b'%' || byte == b'\\' {
        b' '
    } else {
        byte
    }
}

/// Largest `index <= max` that sits on a char boundary of `text`.
#[inline]
fn floor_char_boundary(text: &str, max: usize) -> usize {
    if max >= text.len() {
        return text.len();
    }
    let mut index = max;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Sanitizes `text` and copies it into `dst`, NUL-terminated.
///
/// At most `dst.len() - 1` bytes of text are copied; longer input is cut at
/// a character boundary. The remainder of `dst` is zero-filled. Returns the
/// number of text bytes written, excluding the terminator.
///
/// Replaced bytes are all single-byte ASCII, so sanitizing cannot break a
/// multi-byte sequence and the stored run stays valid UTF-8.
pub fn clean_copy(dst: &mut [u8], text: &str) -> usize {
    if dst.is_empty() {
        return 0;
    }
    let len = floor_char_boundary(text, dst.len() - 1);
    for (slot, &byte) in dst[..len].iter_mut().zip(text.as_bytes()) {
        *slot = sanitize_byte(byte);
    }
    dst[len..].fill(0);
    len
}

/// Decodes a fixed-size field: bytes up to the first NUL, lossily as UTF-8.
///
/// Lossy because the peer process is not obliged to have written through
/// [`clean_copy`].
pub fn decode_field(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn short_text_is_copied_and_terminated() {
        let mut buf = [0xAAu8; 20];
        let written = clean_copy(&mut buf, "Ready");
        assert_eq!(written, 5);
        assert_eq!(&buf[..5], b"Ready");
        assert!(buf[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn long_text_is_truncated_not_rejected() {
        let mut buf = [0u8; 8];
        let written = clean_copy(&mut buf, "0123456789");
        assert_eq!(written, 7);
        assert_eq!(decode_field(&buf), "0123456");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // "née" is 4 bytes; a 4-byte buffer holds 3 text bytes, which would
        // split the final 'é'.
        let mut buf = [0u8; 4];
        let written = clean_copy(&mut buf, "née");
        assert_eq!(written, 3);
        assert_eq!(decode_field(&buf), "né");
    }

    #[test]
    fn forbidden_bytes_become_spaces() {
        let mut buf = [0u8; 32];
        clean_copy(&mut buf, "a\tb\nc%d\\e\x1f");
        assert_eq!(decode_field(&buf), "a b c d e ");
    }

    #[test]
    fn whole_buffer_is_overwritten() {
        let mut buf = [0u8; 12];
        clean_copy(&mut buf, "long placeholder");
        clean_copy(&mut buf, "hi");
        assert_eq!(decode_field(&buf), "hi");
        assert!(buf[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_without_nul_takes_whole_run() {
        assert_eq!(decode_field(b"abcd"), "abcd");
    }

    #[test]
    fn empty_destination_writes_nothing() {
        let mut buf = [0u8; 0];
        assert_eq!(clean_copy(&mut buf, "x"), 0);
        let mut one = [0xFFu8; 1];
        assert_eq!(clean_copy(&mut one, "x"), 0);
        assert_eq!(one[0], 0);
    }

    proptest! {
        #[test]
        fn clean_copy_is_idempotent(text in ".{0,64}") {
            let mut first = [0u8; 24];
            clean_copy(&mut first, &text);
            let decoded = decode_field(&first);

            let mut second = [0u8; 24];
            clean_copy(&mut second, &decoded);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn stored_text_is_clean_and_bounded(text in ".{0,64}") {
            let mut buf = [0u8; 24];
            let written = clean_copy(&mut buf, &text);
            prop_assert!(written < buf.len());
            let decoded = decode_field(&buf);
            prop_assert_eq!(decoded.len(), written);
            prop_assert!(!decoded.bytes().any(|b| b < 0x20 || b == b'%' || b == b'\\'));
        }
    }
}
