use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use mio::event::Event;
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token, Waker};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::http::connection::{Connection, Progress};
use crate::http::handler::FileService;
use crate::http::resolve::DocumentRoot;

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);
const FIRST_CONNECTION: usize = 2;

/// How often idle connections are checked when an idle timeout is set.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Stops a running [`Server`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) -> io::Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        self.waker.wake()
    }
}

/// Single-threaded, readiness-driven HTTP server.
///
/// One thread owns the poll instance, the listener and every connection;
/// nothing here is shared, so the connection table needs no locking.
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    service: FileService,
    max_events: usize,
    max_request_line: usize,
    max_pipelined: usize,
    idle_timeout: Option<Duration>,
    shutdown: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl Server {
    /// Binds the listener and registers it for readability.
    pub fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let root = DocumentRoot::new(&cfg.static_files.root).with_context(|| {
            format!(
                "opening document root {}",
                cfg.static_files.root.display()
            )
        })?;

        let poll = Poll::new().context("creating poll instance")?;

        let addr = cfg.listen_addr();
        let mut listener =
            TcpListener::bind(addr).with_context(|| format!("binding listener on {addr}"))?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .context("registering listener")?;

        let waker = Waker::new(poll.registry(), WAKER).context("creating waker")?;

        info!(
            addr = %listener.local_addr().unwrap_or(addr),
            root = %root.path().display(),
            "Listening"
        );

        Ok(Self {
            poll,
            listener,
            connections: HashMap::new(),
            next_token: FIRST_CONNECTION,
            service: FileService::new(root, &cfg.static_files),
            max_events: cfg.server.max_events.max(1),
            max_request_line: cfg.server.max_request_line,
            max_pipelined: cfg.server.max_pipelined,
            idle_timeout: cfg.server.idle_timeout(),
            shutdown: Arc::new(AtomicBool::new(false)),
            waker: Arc::new(waker),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            waker: Arc::clone(&self.waker),
        }
    }

    /// Runs the event loop until shutdown is requested or a listener error
    /// occurs. Listener errors are fatal and returned to the caller.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut events = Events::with_capacity(self.max_events);
        let timeout = self.idle_timeout.map(|t| t.min(SWEEP_INTERVAL));

        loop {
            if let Err(e) = self.poll.poll(&mut events, timeout) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                error!(error = %e, "Readiness wait failed");
                return Err(e).context("waiting for readiness events");
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => {
                        if let Err(e) = self.accept() {
                            error!(error = %e, "Accept failed, stopping server");
                            return Err(e).context("accepting connection");
                        }
                    }
                    WAKER => {}
                    token => self.dispatch(token, event),
                }
            }

            if self.shutdown.load(Ordering::SeqCst) {
                info!(open = self.connections.len(), "Shutting down");
                self.close_all();
                return Ok(());
            }

            self.expire_idle();
        }
    }

    /// Accepts every pending connection. The listener is edge-triggered, so
    /// it must be drained until it would block.
    fn accept(&mut self) -> io::Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let token = Token(self.next_token);
            self.next_token += 1;

            let mut conn = Connection::new(
                stream,
                token,
                peer,
                self.max_request_line,
                self.max_pipelined,
            );
            conn.register(self.poll.registry())?;

            info!(peer = %peer, token = token.0, "Accepted connection");
            self.connections.insert(token, conn);
        }
    }

    fn dispatch(&mut self, token: Token, event: &Event) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        let registry = self.poll.registry();
        let mut progress = Progress::Open;

        if event.is_readable() || event.is_read_closed() || event.is_error() {
            progress = conn.on_readable(registry, &self.service);
        }
        if progress == Progress::Open && event.is_writable() {
            progress = conn.on_writable(registry, &self.service);
        }

        if progress == Progress::Close {
            self.disconnect(token);
        }
    }

    /// Deregisters and closes a connection in one step.
    fn disconnect(&mut self, token: Token) {
        if let Some(conn) = self.connections.remove(&token) {
            conn.close(self.poll.registry());
        }
    }

    fn expire_idle(&mut self) {
        let Some(limit) = self.idle_timeout else {
            return;
        };

        let now = Instant::now();
        let expired: Vec<Token> = self
            .connections
            .iter()
            .filter(|(_, conn)| now.duration_since(conn.last_activity()) >= limit)
            .map(|(token, _)| *token)
            .collect();

        for token in expired {
            if let Some(conn) = self.connections.get(&token) {
                debug!(peer = %conn.peer(), "Idle timeout");
            }
            self.disconnect(token);
        }
    }

    fn close_all(&mut self) {
        let registry = self.poll.registry();
        for (_, conn) in self.connections.drain() {
            conn.close(registry);
        }
    }
}

/// Binds `cfg.listen_addr()` and serves until a fatal error.
pub fn run(cfg: &Config) -> anyhow::Result<()> {
    Server::bind(cfg)?.run()
}
