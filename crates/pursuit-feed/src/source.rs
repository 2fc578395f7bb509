//! Raw message sources for the ingestor.

use std::fmt;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use pursuit_core::constants::{DEFAULT_FEED_ADDR, MAX_FEED_MESSAGE_BYTES};

/// Transport failure. The ingestor backs off and retries on any of these.
#[derive(Debug)]
pub enum FeedError {
    /// Could not resolve or connect to the endpoint.
    Connect { addr: String, source: io::Error },
    /// The peer went away.
    Disconnected,
    /// A message grew past the size limit; the connection was dropped.
    Oversized { len: usize, max: usize },
    Io(io::Error),
    Zmq(zmq::Error),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Connect { addr, source } => write!(f, "connect to {addr} failed: {source}"),
            FeedError::Disconnected => f.write_str("feed disconnected"),
            FeedError::Oversized { len, max } => {
                write!(f, "feed message of {len} bytes exceeds limit of {max}")
            }
            FeedError::Io(e) => write!(f, "feed i/o error: {e}"),
            FeedError::Zmq(e) => write!(f, "zmq error: {e}"),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Connect { source, .. } => Some(source),
            FeedError::Io(e) => Some(e),
            FeedError::Zmq(e) => Some(e),
            FeedError::Disconnected | FeedError::Oversized { .. } => None,
        }
    }
}

impl From<io::Error> for FeedError {
    fn from(e: io::Error) -> Self {
        FeedError::Io(e)
    }
}

impl From<zmq::Error> for FeedError {
    fn from(e: zmq::Error) -> Self {
        FeedError::Zmq(e)
    }
}

/// A push feed of raw telemetry messages.
pub trait FeedSource: Send {
    /// Wait up to `timeout` for the next message. `Ok(None)` means nothing arrived.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, FeedError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// In-process source fed through an mpsc channel.
pub struct ChannelFeed {
    rx: mpsc::Receiver<String>,
}

impl ChannelFeed {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }

    /// A sender and the feed it drives.
    pub fn pair() -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl FeedSource for ChannelFeed {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, FeedError> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(FeedError::Disconnected),
        }
    }

    fn describe(&self) -> String {
        "channel".into()
    }
}

/// Newline-delimited JSON over a plain TCP stream.
///
/// Connects lazily and reconnects on the next call after a disconnect.
/// Bytes of an incomplete line are kept across timeouts, up to
/// `max_message` bytes; a longer line drops the connection.
pub struct TcpFeed {
    addr: String,
    stream: Option<TcpStream>,
    pending: Vec<u8>,
    max_message: usize,
}

impl TcpFeed {
    /// `addr` is `host:port`, optionally prefixed with `tcp://`.
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let addr = addr
            .strip_prefix("tcp://")
            .map(str::to_string)
            .unwrap_or(addr);
        Self {
            addr,
            stream: None,
            pending: Vec::new(),
            max_message: MAX_FEED_MESSAGE_BYTES,
        }
    }

    pub fn with_max_message(mut self, bytes: usize) -> Self {
        self.max_message = bytes;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn resolve(&self) -> Result<SocketAddr, FeedError> {
        let connect_err = |source| FeedError::Connect {
            addr: self.addr.clone(),
            source,
        };
        self.addr
            .to_socket_addrs()
            .map_err(connect_err)?
            .next()
            .ok_or_else(|| {
                connect_err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "address resolved to nothing",
                ))
            })
    }

    fn connect(&mut self, timeout: Duration) -> Result<&mut TcpStream, FeedError> {
        if self.stream.is_none() {
            let addr = self.resolve()?;
            let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|source| {
                FeedError::Connect {
                    addr: self.addr.clone(),
                    source,
                }
            })?;
            stream.set_nodelay(true)?;
            tracing::info!(addr = %self.addr, "connected to telemetry feed");
            self.pending.clear();
            self.stream = Some(stream);
        }
        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(FeedError::Disconnected),
        }
    }

    /// Pop the next non-empty complete line out of `pending`.
    fn take_line(&mut self) -> Option<String> {
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
        None
    }

    fn drop_connection(&mut self) {
        self.stream = None;
        self.pending.clear();
    }
}

impl FeedSource for TcpFeed {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, FeedError> {
        if let Some(line) = self.take_line() {
            return Ok(Some(line));
        }

        // A zero read timeout is rejected by the socket API.
        let timeout = timeout.max(Duration::from_millis(1));
        let deadline = Instant::now() + timeout;
        self.connect(timeout)?;

        let mut buf = [0u8; 4096];
        loop {
            // The whole call, not each read, is bounded by `timeout`.
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let read = match self.stream.as_mut() {
                Some(stream) => stream
                    .set_read_timeout(Some(remaining.max(Duration::from_millis(1))))
                    .and_then(|()| stream.read(&mut buf)),
                None => return Err(FeedError::Disconnected),
            };
            match read {
                Ok(0) => {
                    self.drop_connection();
                    return Err(FeedError::Disconnected);
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    if let Some(line) = self.take_line() {
                        return Ok(Some(line));
                    }
                    if self.pending.len() > self.max_message {
                        let len = self.pending.len();
                        tracing::warn!(len, max = self.max_message, "oversized feed line; dropping connection");
                        self.drop_connection();
                        return Err(FeedError::Oversized {
                            len,
                            max: self.max_message,
                        });
                    }
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return Ok(None);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.drop_connection();
                    return Err(FeedError::Io(e));
                }
            }
        }
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.addr)
    }
}

impl Default for TcpFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_ADDR)
    }
}
