use lantern::http::percent::{decode, encode_segment};

#[test]
fn test_decode_every_byte_value() {
    for value in 0u8..=255 {
        for encoded in [format!("%{value:02x}"), format!("%{value:02X}")] {
            assert_eq!(decode(encoded.as_bytes()), vec![value], "{encoded}");
        }
    }
}

#[test]
fn test_decode_passes_plain_bytes_through() {
    assert_eq!(decode(b"/docs/readme.txt"), b"/docs/readme.txt".to_vec());
    assert_eq!(decode(b""), Vec::<u8>::new());
}

#[test]
fn test_decode_invalid_escape_is_literal() {
    assert_eq!(decode(b"%zz"), b"%zz".to_vec());
    assert_eq!(decode(b"%4g"), b"%4g".to_vec());
    assert_eq!(decode(b"50%"), b"50%".to_vec());
}

#[test]
fn test_decode_mixed() {
    assert_eq!(decode(b"/a%20b/%2e%2E/c%"), b"/a b/../c%".to_vec());
}

#[test]
fn test_decode_never_grows() {
    let inputs: [&[u8]; 5] = [b"%%%", b"%2", b"%%41", b"abc%41%42%4", b"%E5%86%85"];
    for input in inputs {
        assert!(decode(input).len() <= input.len());
    }
}

#[test]
fn test_decode_percent_escape_of_percent() {
    // Decoding is a single pass; "%2541" becomes "%41", not "A".
    assert_eq!(decode(b"%2541"), b"%41".to_vec());
}

#[test]
fn test_encode_segment() {
    assert_eq!(encode_segment(b"plain.txt"), "plain.txt");
    assert_eq!(encode_segment(b"a b#c?"), "a%20b%23c%3F");
    assert_eq!(encode_segment("内".as_bytes()), "%E5%86%85");
}

#[test]
fn test_encode_then_decode_restores_name() {
    let name = "weird name & <tag>.html".as_bytes();
    assert_eq!(decode(encode_segment(name).as_bytes()), name.to_vec());
}
