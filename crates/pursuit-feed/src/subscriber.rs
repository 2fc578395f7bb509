//! ZeroMQ subscriber for the capture agent's PUB socket.

use std::io;
use std::time::Duration;

use pursuit_core::constants::{DEFAULT_FEED_ADDR, MAX_FEED_MESSAGE_BYTES};

use crate::source::{FeedError, FeedSource};

/// SUB socket subscribed to every topic.
///
/// The socket is created on first use. Any error other than a receive
/// timeout closes it, and the next call reconnects. Messages over the size
/// limit are discarded by the socket itself.
pub struct ZmqFeed {
    endpoint: String,
    context: zmq::Context,
    socket: Option<zmq::Socket>,
    /// Receive timeout currently set on the socket, in ms.
    rcvtimeo: Option<i32>,
}

impl ZmqFeed {
    /// `endpoint` is a ZeroMQ endpoint; a bare `host:port` means `tcp://host:port`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.contains("://") {
            endpoint
        } else {
            format!("tcp://{endpoint}")
        };
        Self {
            endpoint,
            context: zmq::Context::new(),
            socket: None,
            rcvtimeo: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn connect(&mut self) -> Result<(), FeedError> {
        if self.socket.is_some() {
            return Ok(());
        }
        let socket = self.context.socket(zmq::SUB)?;
        socket.set_linger(0)?;
        socket.set_maxmsgsize(MAX_FEED_MESSAGE_BYTES as i64)?;
        socket.set_subscribe(b"")?;
        socket
            .connect(&self.endpoint)
            .map_err(|e| FeedError::Connect {
                addr: self.endpoint.clone(),
                source: io::Error::new(io::ErrorKind::Other, e),
            })?;
        tracing::info!(endpoint = %self.endpoint, "subscribed to telemetry feed");
        self.rcvtimeo = None;
        self.socket = Some(socket);
        Ok(())
    }
}

impl FeedSource for ZmqFeed {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>, FeedError> {
        self.connect()?;
        let Some(socket) = self.socket.as_ref() else {
            return Err(FeedError::Disconnected);
        };

        let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        if self.rcvtimeo != Some(ms) {
            socket.set_rcvtimeo(ms)?;
            self.rcvtimeo = Some(ms);
        }

        match socket.recv_multipart(0) {
            // A topic frame, if the publisher sends one, precedes the payload.
            Ok(mut parts) => Ok(parts
                .pop()
                .map(|payload| String::from_utf8_lossy(&payload).into_owned())),
            Err(zmq::Error::EAGAIN) | Err(zmq::Error::EINTR) => Ok(None),
            Err(e) => {
                self.socket = None;
                Err(FeedError::Zmq(e))
            }
        }
    }

    fn describe(&self) -> String {
        format!("zmq+{}", self.endpoint)
    }
}

impl Default for ZmqFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_ADDR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// PUB socket on an ephemeral port; returns it and its endpoint.
    fn publisher(ctx: &zmq::Context) -> (zmq::Socket, String) {
        let socket = ctx.socket(zmq::PUB).unwrap();
        socket.bind("tcp://127.0.0.1:*").unwrap();
        let endpoint = socket.get_last_endpoint().unwrap().unwrap();
        (socket, endpoint)
    }

    #[test]
    fn test_endpoint_scheme_defaults_to_tcp() {
        assert_eq!(ZmqFeed::new("127.0.0.1:3000").endpoint(), "tcp://127.0.0.1:3000");
        assert_eq!(ZmqFeed::new("ipc:///tmp/feed").endpoint(), "ipc:///tmp/feed");
        assert_eq!(ZmqFeed::default().endpoint(), DEFAULT_FEED_ADDR);
    }

    #[test]
    fn test_times_out_without_publisher() {
        let mut feed = ZmqFeed::new("tcp://127.0.0.1:1");
        let started = Instant::now();
        assert!(matches!(feed.recv_timeout(Duration::from_millis(30)), Ok(None)));
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(feed.is_connected());
    }

    #[test]
    fn test_receives_published_frames() {
        let ctx = zmq::Context::new();
        let (publisher, endpoint) = publisher(&ctx);
        let mut feed = ZmqFeed::new(endpoint);

        // Subscriptions propagate asynchronously; publish until one lands.
        let mut got = None;
        for _ in 0..200 {
            publisher.send(r#"{"timestamp":"1"}"#, 0).unwrap();
            if let Some(msg) = feed.recv_timeout(Duration::from_millis(10)).unwrap() {
                got = Some(msg);
                break;
            }
        }
        assert_eq!(got.as_deref(), Some(r#"{"timestamp":"1"}"#));

        publisher.send_multipart(["telemetry", r#"{"timestamp":"2"}"#], 0).unwrap();
        let mut last = None;
        for _ in 0..50 {
            if let Some(msg) = feed.recv_timeout(Duration::from_millis(10)).unwrap() {
                last = Some(msg);
                if last.as_deref() == Some(r#"{"timestamp":"2"}"#) {
                    break;
                }
            }
        }
        assert_eq!(last.as_deref(), Some(r#"{"timestamp":"2"}"#));
    }
}
