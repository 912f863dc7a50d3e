use std::fs::File;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use bytes::{Buf, BytesMut};

use crate::http::listing::DirectoryListing;
use crate::http::mime;
use crate::http::response::{ResponseHead, StatusCode};

/// Where the bytes after the head come from.
#[derive(Debug)]
pub enum Body {
    Empty,
    /// A file streamed in chunks, never past `remaining` bytes so the
    /// advertised Content-Length holds even if the file grows.
    File { file: File, remaining: u64 },
    Listing(DirectoryListing),
}

/// Outcome of a [`ResponseWriter::write_to`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// Everything has been written.
    Complete,
    /// The sink would block; call again once it is writable.
    Blocked,
}

/// Streams one response to a non-blocking sink.
///
/// All progress lives in the writer itself (unsent bytes plus the body
/// source), so a write that would block can be resumed later from exactly
/// where it stopped.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    pending: BytesMut,
    body: Body,
    chunk_size: usize,
    pacing: Option<Duration>,
    close: bool,
    body_chunks: u64,
}

impl ResponseWriter {
    pub fn new(head: ResponseHead, body: Body) -> Self {
        let mut pending = BytesMut::with_capacity(256);
        head.encode(&mut pending);

        Self {
            status: head.status,
            pending,
            body,
            chunk_size: 1024,
            pacing: None,
            close: head.close,
            body_chunks: 0,
        }
    }

    /// A short plain-text error response that closes the connection.
    pub fn rejection(status: StatusCode) -> Self {
        let text = format!("{} {}\n", status.as_u16(), status.reason_phrase());
        let head = ResponseHead::new(status, mime::DEFAULT_CONTENT_TYPE, Some(text.len() as u64))
            .with_close();

        let mut writer = Self::new(head, Body::Empty);
        writer.pending.extend_from_slice(text.as_bytes());
        writer
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sleeps for `pacing` between body chunks.
    pub fn with_pacing(mut self, pacing: Option<Duration>) -> Self {
        self.pacing = pacing.filter(|d| !d.is_zero());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the connection must be closed after this response.
    pub fn closes_connection(&self) -> bool {
        self.close
    }

    /// Writes as much of the response as `out` accepts.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> io::Result<WriteStatus> {
        loop {
            while !self.pending.is_empty() {
                match out.write(&self.pending) {
                    Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                    Ok(n) => self.pending.advance(n),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        return Ok(WriteStatus::Blocked);
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }

            if self.body_chunks > 0 {
                if let Some(delay) = self.pacing {
                    thread::sleep(delay);
                }
            }

            if !self.refill()? {
                return Ok(WriteStatus::Complete);
            }
            self.body_chunks += 1;
        }
    }

    /// Loads the next body chunk into `pending`. Returns false at the end of
    /// the body.
    fn refill(&mut self) -> io::Result<bool> {
        match &mut self.body {
            Body::Empty => Ok(false),
            Body::File { file, remaining } => {
                if *remaining == 0 {
                    self.body = Body::Empty;
                    return Ok(false);
                }

                let want = (*remaining).min(self.chunk_size as u64) as usize;
                self.pending.resize(want, 0);
                let n = loop {
                    match file.read(&mut self.pending[..]) {
                        Ok(n) => break n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            self.pending.clear();
                            return Err(e);
                        }
                    }
                };
                self.pending.truncate(n);

                if n == 0 {
                    // Shrunk since it was measured; the peer sees a short body.
                    self.body = Body::Empty;
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file ended before its advertised length",
                    ));
                }
                *remaining -= n as u64;
                Ok(true)
            }
            Body::Listing(listing) => Ok(listing.next_chunk(&mut self.pending)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `budget` bytes, then reports would-block.
    struct Throttled {
        written: Vec<u8>,
        budget: usize,
    }

    impl Write for Throttled {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn resumes_after_would_block() {
        let mut writer = ResponseWriter::rejection(StatusCode::UriTooLong);
        let mut sink = Throttled {
            written: Vec::new(),
            budget: 10,
        };

        assert_eq!(writer.write_to(&mut sink).unwrap(), WriteStatus::Blocked);
        assert_eq!(sink.written.len(), 10);

        sink.budget = usize::MAX;
        assert_eq!(writer.write_to(&mut sink).unwrap(), WriteStatus::Complete);

        let text = String::from_utf8(sink.written).unwrap();
        assert!(text.starts_with("HTTP/1.1 414 URI Too Long\r\n"));
        assert!(text.ends_with("\r\n\r\n414 URI Too Long\n"));
    }
}
