use bytes::{BufMut, BytesMut};

const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes the server produces.
///
/// - `Ok` (200): file or directory found
/// - `NotFound` (404): nothing at the requested path
/// - `UriTooLong` (414): request line over the configured limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 414 URI Too Long
    UriTooLong,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::UriTooLong => 414,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::UriTooLong => "URI Too Long",
        }
    }
}

/// Status line and headers of a response.
///
/// The body is not part of the head; it is streamed afterwards by the
/// [`ResponseWriter`](crate::http::writer::ResponseWriter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub content_type: &'static str,
    /// Exact body length, or `None` when the body is streamed without one.
    pub content_length: Option<u64>,
    /// Whether the connection is closed once the body is written.
    pub close: bool,
}

impl ResponseHead {
    /// Creates a head. A response without a known length always closes the
    /// connection, since the end of the body is signalled by the close.
    pub fn new(
        status: StatusCode,
        content_type: &'static str,
        content_length: Option<u64>,
    ) -> Self {
        Self {
            status,
            content_type,
            content_length,
            close: content_length.is_none(),
        }
    }

    pub fn with_close(mut self) -> Self {
        self.close = true;
        self
    }

    /// Serializes the status line, headers and the blank separator line.
    pub fn encode(&self, dst: &mut BytesMut) {
        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        dst.put_slice(status_line.as_bytes());

        dst.put_slice(b"Content-Type: ");
        dst.put_slice(self.content_type.as_bytes());
        dst.put_slice(b"\r\n");

        if let Some(length) = self.content_length {
            dst.put_slice(format!("Content-Length: {length}\r\n").as_bytes());
        }

        if self.close {
            dst.put_slice(b"Connection: close\r\n");
        }

        // Header/body separator
        dst.put_slice(b"\r\n");
    }
}
