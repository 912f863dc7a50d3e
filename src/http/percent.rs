//! Percent-encoding helpers for request paths.

/// Decodes `%XY` escapes (hex digits in either case) into the byte they encode.
///
/// Every other byte, including a `%` that is not followed by two hex digits,
/// is copied through unchanged, so the output is never longer than the input.
/// The result is not validated as UTF-8.
///
/// # Example
///
/// ```
/// # use lantern::http::percent::decode;
/// assert_eq!(decode(b"/a%20b"), b"/a b".to_vec());
/// assert_eq!(decode(b"100%"), b"100%".to_vec());
/// ```
pub fn decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            if let (Some(hi), Some(lo)) = (hex_value(input[i + 1]), hex_value(input[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }

        out.push(input[i]);
        i += 1;
    }

    out
}

/// Percent-encodes a single path segment for use inside an `href`.
///
/// Unreserved characters (`A-Z a-z 0-9 - . _ ~`) are kept, everything else
/// becomes `%XY` with uppercase hex digits.
pub fn encode_segment(segment: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(segment.len());
    for &b in segment {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
    out
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
