use std::collections::VecDeque;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::time::Instant;

use bytes::BytesMut;
use mio::net::TcpStream;
use mio::{Interest, Registry, Token};
use tracing::{debug, warn};

use crate::http::decoder::{DecodeError, RequestDecoder};
use crate::http::handler::FileService;
use crate::http::parser::{ParseError, parse_request_line};
use crate::http::response::StatusCode;
use crate::http::writer::{ResponseWriter, WriteStatus};

/// Bytes read from the socket per attempt.
const READ_CHUNK: usize = 1024;

/// Whether a connection survives the event it just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Open,
    Close,
}

/// Work queued on a connection, answered strictly in arrival order.
#[derive(Debug)]
enum Pending {
    Line(BytesMut),
    Reject(StatusCode),
}

/// One accepted client.
///
/// Incoming bytes are drained until the socket would block and framed into
/// request lines as they arrive; only an unfinished request line is kept
/// between readiness events. While a response is being streamed, further
/// requests wait in `pending`. Once `pending` is full, reading pauses and
/// resumes as responses complete.
pub struct Connection {
    stream: TcpStream,
    token: Token,
    peer: SocketAddr,
    inbound: BytesMut,
    decoder: RequestDecoder,
    pending: VecDeque<Pending>,
    max_pipelined: usize,
    writer: Option<ResponseWriter>,
    writable_interest: bool,
    /// Stop buffering input; the connection closes after a rejection.
    discarding: bool,
    /// Reading stopped on a full queue before the socket would block.
    read_paused: bool,
    received: u64,
    last_activity: Instant,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        token: Token,
        peer: SocketAddr,
        max_request_line: usize,
        max_pipelined: usize,
    ) -> Self {
        Self {
            stream,
            token,
            peer,
            inbound: BytesMut::with_capacity(READ_CHUNK),
            decoder: RequestDecoder::new(max_request_line),
            pending: VecDeque::new(),
            max_pipelined: max_pipelined.max(1),
            writer: None,
            writable_interest: false,
            discarding: false,
            read_paused: false,
            received: 0,
            last_activity: Instant::now(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Registers for edge-triggered readability.
    pub fn register(&mut self, registry: &Registry) -> io::Result<()> {
        registry.register(&mut self.stream, self.token, Interest::READABLE)
    }

    /// Removes the connection from the multiplexer and closes it. The socket
    /// is closed even when deregistration fails.
    pub fn close(mut self, registry: &Registry) {
        if let Err(e) = registry.deregister(&mut self.stream) {
            warn!(peer = %self.peer, error = %e, "Failed to deregister connection");
        }
        debug!(peer = %self.peer, received = self.received, "Connection closed");
    }

    /// Drains the socket, then answers whatever complete requests arrived.
    pub fn on_readable(&mut self, registry: &Registry, service: &FileService) -> Progress {
        if let Progress::Close = self.fill() {
            return Progress::Close;
        }
        self.process(registry, service)
    }

    /// Resumes a response that previously hit a full socket.
    pub fn on_writable(&mut self, registry: &Registry, service: &FileService) -> Progress {
        self.last_activity = Instant::now();
        self.process(registry, service)
    }

    /// Frames buffered input and reads more until the socket would block or
    /// the pending queue is full. In the latter case the rest stays in the
    /// kernel (or in `inbound`) until [`Self::process`] makes room.
    fn fill(&mut self) -> Progress {
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            self.frame_requests();
            if self.pending.len() >= self.max_pipelined {
                self.read_paused = true;
                return Progress::Open;
            }

            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    debug!(peer = %self.peer, "Peer closed connection");
                    return Progress::Close;
                }
                Ok(n) => {
                    self.received += n as u64;
                    self.last_activity = Instant::now();
                    if !self.discarding {
                        self.inbound.extend_from_slice(&chunk[..n]);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.read_paused = false;
                    return Progress::Open;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "Read failed");
                    return Progress::Close;
                }
            }
        }
    }

    /// Moves complete request lines from `inbound` into `pending`, stopping
    /// when the queue is full.
    fn frame_requests(&mut self) {
        while self.pending.len() < self.max_pipelined {
            match self.decoder.decode(&mut self.inbound) {
                Ok(Some(line)) => self.pending.push_back(Pending::Line(line)),
                Ok(None) => return,
                Err(DecodeError::RequestLineTooLong { limit }) => {
                    warn!(peer = %self.peer, limit, "Request line too long");
                    self.inbound.clear();
                    self.discarding = true;
                    self.pending.push_back(Pending::Reject(StatusCode::UriTooLong));
                    return;
                }
            }
        }
    }

    fn process(&mut self, registry: &Registry, service: &FileService) -> Progress {
        loop {
            if let Some(writer) = self.writer.as_mut() {
                match writer.write_to(&mut self.stream) {
                    Ok(WriteStatus::Complete) => {
                        let close = writer.closes_connection();
                        self.writer = None;
                        if close {
                            return Progress::Close;
                        }
                    }
                    Ok(WriteStatus::Blocked) => return self.set_writable_interest(registry, true),
                    Err(e) => {
                        warn!(peer = %self.peer, error = %e, "Write failed");
                        return Progress::Close;
                    }
                }
            }

            if self.read_paused && self.pending.len() < self.max_pipelined {
                if let Progress::Close = self.fill() {
                    return Progress::Close;
                }
            }

            match self.pending.pop_front() {
                None => return self.set_writable_interest(registry, false),
                Some(Pending::Reject(status)) => {
                    self.writer = Some(ResponseWriter::rejection(status));
                }
                Some(Pending::Line(line)) => match parse_request_line(&line) {
                    Ok(request) => self.writer = Some(service.respond(&request)),
                    Err(ParseError::UnsupportedMethod(method)) => {
                        debug!(peer = %self.peer, method = %method, "Ignoring unsupported method");
                    }
                    Err(e @ ParseError::Malformed) => {
                        warn!(
                            peer = %self.peer,
                            error = %e,
                            line = %String::from_utf8_lossy(&line),
                            "Dropping connection"
                        );
                        return Progress::Close;
                    }
                },
            }
        }
    }

    /// Switches between readable and readable+writable registration.
    fn set_writable_interest(&mut self, registry: &Registry, writable: bool) -> Progress {
        if self.writable_interest == writable {
            return Progress::Open;
        }

        let interest = if writable {
            Interest::READABLE | Interest::WRITABLE
        } else {
            Interest::READABLE
        };

        match registry.reregister(&mut self.stream, self.token, interest) {
            Ok(()) => {
                self.writable_interest = writable;
                Progress::Open
            }
            Err(e) => {
                warn!(peer = %self.peer, error = %e, "Failed to update interest");
                Progress::Close
            }
        }
    }
}
