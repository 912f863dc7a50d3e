//! Incremental framing of request lines.
//!
//! Bytes arrive in arbitrary pieces across readiness events. The decoder
//! consumes them from the connection's inbound buffer, yields each complete
//! request line, and then swallows the header block that follows it up to
//! the blank line. Only a partial request line is ever left in the buffer,
//! so the buffer stays bounded by the configured line limit.

use std::fmt;

use bytes::{Buf, BytesMut};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    RequestLineTooLong { limit: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::RequestLineTooLong { limit } => {
                write!(f, "request line exceeds {limit} bytes")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    RequestLine,
    /// Skipping header lines; `line_len` counts bytes of the current line
    /// other than CR.
    Headers { line_len: usize },
}

#[derive(Debug)]
pub struct RequestDecoder {
    max_line: usize,
    state: State,
}

impl RequestDecoder {
    pub fn new(max_line: usize) -> Self {
        Self {
            max_line,
            state: State::RequestLine,
        }
    }

    /// Consumes bytes from `src` and returns the next complete request line
    /// without its line terminator.
    ///
    /// Returns `Ok(None)` once `src` holds nothing but an unfinished line
    /// (which is left in place for the next call). Empty lines before a
    /// request line are skipped. A request line longer than the limit is an
    /// error whether or not its terminator has arrived.
    pub fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, DecodeError> {
        loop {
            match self.state {
                State::Headers { line_len } => {
                    if !self.skip_headers(src, line_len) {
                        return Ok(None);
                    }
                }
                State::RequestLine => {
                    let Some(newline) = src.iter().position(|&b| b == b'\n') else {
                        // One spare byte for a CR whose LF has not arrived.
                        if src.len() > self.max_line + 1 {
                            return Err(DecodeError::RequestLineTooLong {
                                limit: self.max_line,
                            });
                        }
                        return Ok(None);
                    };

                    let mut line = src.split_to(newline + 1);
                    line.truncate(newline);
                    if line.last() == Some(&b'\r') {
                        line.truncate(newline - 1);
                    }

                    if line.is_empty() {
                        continue;
                    }
                    if line.len() > self.max_line {
                        return Err(DecodeError::RequestLineTooLong {
                            limit: self.max_line,
                        });
                    }

                    self.state = State::Headers { line_len: 0 };
                    return Ok(Some(line));
                }
            }
        }
    }

    /// Discards header bytes. Returns true when the blank line ending the
    /// header block was consumed.
    fn skip_headers(&mut self, src: &mut BytesMut, mut line_len: usize) -> bool {
        let mut consumed = 0;
        let mut finished = false;

        for &b in src.iter() {
            consumed += 1;
            match b {
                b'\n' if line_len == 0 => {
                    finished = true;
                    break;
                }
                b'\n' => line_len = 0,
                b'\r' => {}
                _ => line_len += 1,
            }
        }

        src.advance(consumed);
        self.state = if finished {
            State::RequestLine
        } else {
            State::Headers { line_len }
        };
        finished
    }
}
