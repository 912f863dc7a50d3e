use std::fmt;

use crate::http::request::{Method, RequestLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Missing method or target token.
    Malformed,
    /// A well-formed line whose method is not GET.
    UnsupportedMethod(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Malformed => write!(f, "malformed request line"),
            ParseError::UnsupportedMethod(m) => write!(f, "unsupported method {m:?}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a request line (without its CRLF terminator).
///
/// The line is split on runs of spaces or tabs. The first token is the
/// method, the second the raw target; a trailing version token is allowed
/// but neither validated nor returned. The target is passed on as opaque
/// bytes; only the method has to be text.
pub fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let mut parts = line
        .split(|&b| b == b' ' || b == b'\t')
        .filter(|part| !part.is_empty());

    let method_token = parts.next().ok_or(ParseError::Malformed)?;
    let path = parts.next().ok_or(ParseError::Malformed)?;

    let method = std::str::from_utf8(method_token)
        .ok()
        .and_then(Method::from_token)
        .ok_or_else(|| {
            ParseError::UnsupportedMethod(String::from_utf8_lossy(method_token).into_owned())
        })?;

    Ok(RequestLine {
        method,
        path: path.to_vec(),
    })
}
