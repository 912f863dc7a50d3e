use bytes::BytesMut;
use lantern::http::decoder::{DecodeError, RequestDecoder};

fn lines(decoder: &mut RequestDecoder, src: &mut BytesMut) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(line) = decoder.decode(src).unwrap() {
        out.push(String::from_utf8(line.to_vec()).unwrap());
    }
    out
}

#[test]
fn test_decode_single_request() {
    let mut decoder = RequestDecoder::new(4096);
    let mut src = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n"[..]);

    assert_eq!(lines(&mut decoder, &mut src), vec!["GET / HTTP/1.1"]);
    assert!(src.is_empty());
}

#[test]
fn test_decode_line_split_across_reads() {
    let mut decoder = RequestDecoder::new(4096);
    let mut src = BytesMut::from(&b"GET /hel"[..]);

    assert_eq!(decoder.decode(&mut src).unwrap(), None);
    assert_eq!(&src[..], b"GET /hel");

    src.extend_from_slice(b"lo.txt HTTP/1.1\r");
    assert_eq!(decoder.decode(&mut src).unwrap(), None);

    src.extend_from_slice(b"\nHost: x\r\n\r\n");
    assert_eq!(lines(&mut decoder, &mut src), vec!["GET /hello.txt HTTP/1.1"]);
}

#[test]
fn test_decode_headers_split_across_reads() {
    let mut decoder = RequestDecoder::new(4096);
    let mut src = BytesMut::from(&b"GET /a HTTP/1.1\r\nHost: x\r"[..]);

    assert_eq!(lines(&mut decoder, &mut src), vec!["GET /a HTTP/1.1"]);

    // The blank line arrives in pieces; the next request follows it.
    src.extend_from_slice(b"\n\r");
    assert_eq!(decoder.decode(&mut src).unwrap(), None);
    src.extend_from_slice(b"\nGET /b HTTP/1.1\r\n\r\n");
    assert_eq!(lines(&mut decoder, &mut src), vec!["GET /b HTTP/1.1"]);
}

#[test]
fn test_decode_pipelined_requests() {
    let mut decoder = RequestDecoder::new(4096);
    let mut src = BytesMut::from(
        &b"GET /a HTTP/1.1\r\nHost: x\r\nAccept: */*\r\n\r\n\
           GET /b HTTP/1.1\r\n\r\n\
           GET /c HTTP/1.1\r\n\r\n"[..],
    );

    assert_eq!(
        lines(&mut decoder, &mut src),
        vec!["GET /a HTTP/1.1", "GET /b HTTP/1.1", "GET /c HTTP/1.1"]
    );
}

#[test]
fn test_decode_skips_leading_blank_lines() {
    let mut decoder = RequestDecoder::new(4096);
    let mut src = BytesMut::from(&b"\r\n\r\nGET / HTTP/1.1\r\n\r\n"[..]);

    assert_eq!(lines(&mut decoder, &mut src), vec!["GET / HTTP/1.1"]);
}

#[test]
fn test_decode_header_bytes_are_not_retained() {
    let mut decoder = RequestDecoder::new(32);
    let mut src = BytesMut::from(&b"GET / HTTP/1.1\r\n"[..]);
    assert_eq!(lines(&mut decoder, &mut src), vec!["GET / HTTP/1.1"]);

    // A header far longer than the line limit is consumed, not buffered.
    let long_header = format!("Cookie: {}\r\n", "x".repeat(1000));
    src.extend_from_slice(long_header.as_bytes());
    assert_eq!(decoder.decode(&mut src).unwrap(), None);
    assert!(src.is_empty());
}

#[test]
fn test_decode_rejects_overlong_unterminated_line() {
    let mut decoder = RequestDecoder::new(16);
    let mut src = BytesMut::from(&b"GET /aaaaaaaaaaaaaaaaaaaa"[..]);

    assert_eq!(
        decoder.decode(&mut src),
        Err(DecodeError::RequestLineTooLong { limit: 16 })
    );
}

#[test]
fn test_decode_rejects_overlong_terminated_line() {
    let mut decoder = RequestDecoder::new(16);
    let mut src = BytesMut::from(&b"GET /aaaaaaaaaaaaaaaaaaaa HTTP/1.1\r\n\r\n"[..]);

    assert_eq!(
        decoder.decode(&mut src),
        Err(DecodeError::RequestLineTooLong { limit: 16 })
    );
}

#[test]
fn test_decode_line_at_limit_is_accepted() {
    let mut decoder = RequestDecoder::new(14);
    let mut src = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);

    assert_eq!(lines(&mut decoder, &mut src), vec!["GET / HTTP/1.1"]);
}
