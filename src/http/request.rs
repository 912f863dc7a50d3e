use std::borrow::Cow;

/// HTTP request methods the server accepts.
///
/// Only retrieval is supported; any other token on the request line is
/// reported by the parser as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    Get,
}

impl Method {
    /// Parses a method token, ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Some(Method::Get));
    /// assert_eq!(Method::from_token("get"), Some(Method::Get));
    /// assert_eq!(Method::from_token("POST"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("get") {
            Some(Method::Get)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// The method and raw target of one request.
///
/// Exists only while a single request is being answered. The protocol
/// version token is read by the parser but not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The request method
    pub method: Method,
    /// The raw, still percent-encoded request target (e.g. "/docs/a%20b.txt").
    /// Kept as bytes: names on disk need not be UTF-8.
    pub path: Vec<u8>,
}

impl RequestLine {
    pub fn get(path: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
        }
    }

    /// The target for log output, with invalid UTF-8 replaced.
    pub fn path_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }
}
