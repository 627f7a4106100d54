//! Fixed-size message transport over TCP.
//!
//! Every message on every link has a size both ends know in advance, so
//! there is no framing here: `receive` reads exactly the number of bytes
//! asked for. A peer that goes away shows up as [`TransportError::Closed`],
//! anything else the socket reports as [`TransportError::Io`].

use std::io;
use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection closed by peer")]
    Closed,
    #[error("not connected")]
    NotConnected,
    #[error("accepted connections cannot reconnect")]
    NotReconnectable,
    #[error("{op} failed: {reason}")]
    Io { op: &'static str, reason: String },
}

impl TransportError {
    fn io(op: &'static str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => TransportError::Closed,
            _ => TransportError::Io {
                op,
                reason: err.to_string(),
            },
        }
    }
}

pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::io("bind", e))?;
        Ok(Listener { inner })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.inner
            .local_addr()
            .map_err(|e| TransportError::io("local_addr", e))
    }

    pub async fn accept(&self) -> Result<(Connection, SocketAddr), TransportError> {
        let (stream, peer) = self
            .inner
            .accept()
            .await
            .map_err(|e| TransportError::io("accept", e))?;
        let _ = stream.set_nodelay(true);
        Ok((Connection::from_stream(stream, None), peer))
    }
}

/// One TCP connection.
///
/// Connections made with [`Connection::connect`] remember their target and
/// can [`reconnect`](Connection::reconnect); accepted ones cannot.
pub struct Connection {
    stream: Option<TcpStream>,
    /// Set for client-role connections.
    target: Option<String>,
    read_buf: BytesMut,
}

impl Connection {
    fn from_stream(stream: TcpStream, target: Option<String>) -> Self {
        Connection {
            stream: Some(stream),
            target,
            read_buf: BytesMut::with_capacity(4096),
        }
    }

    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = open(addr).await?;
        Ok(Self::from_stream(stream, Some(addr.to_string())))
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream
            .write_all(bytes)
            .await
            .map_err(|e| TransportError::io("send", e))?;
        stream
            .flush()
            .await
            .map_err(|e| TransportError::io("send", e))
    }

    /// Read exactly `expected` bytes.
    pub async fn receive(&mut self, expected: usize) -> Result<Bytes, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        while self.read_buf.len() < expected {
            let n = stream
                .read_buf(&mut self.read_buf)
                .await
                .map_err(|e| TransportError::io("receive", e))?;
            if n == 0 {
                if !self.read_buf.is_empty() {
                    debug!(
                        got = self.read_buf.len(),
                        expected, "peer closed mid-message"
                    );
                }
                return Err(TransportError::Closed);
            }
        }
        Ok(self.read_buf.split_to(expected).freeze())
    }

    /// Drop the current socket and dial the same target again.
    pub async fn reconnect(&mut self) -> Result<(), TransportError> {
        let target = self.target.clone().ok_or(TransportError::NotReconnectable)?;
        self.disconnect().await;
        self.stream = Some(open(&target).await?);
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        self.read_buf.clear();
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}

async fn open(addr: &str) -> Result<TcpStream, TransportError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| TransportError::io("connect", e))?;
    let _ = stream.set_nodelay(true);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pair() -> (Connection, Connection) {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (client, accepted) = tokio::join!(Connection::connect(&addr), listener.accept());
        (client.unwrap(), accepted.unwrap().0)
    }

    #[tokio::test]
    async fn receive_reads_exactly_what_was_asked() {
        let (mut client, mut server) = pair().await;
        client.send(b"abcdef").await.unwrap();

        assert_eq!(&server.receive(2).await.unwrap()[..], b"ab");
        assert_eq!(&server.receive(4).await.unwrap()[..], b"cdef");
    }

    #[tokio::test]
    async fn eof_is_closed_even_mid_message() {
        let (mut client, mut server) = pair().await;
        client.send(b"abc").await.unwrap();
        client.disconnect().await;

        assert_eq!(server.receive(8).await, Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn only_client_connections_reconnect() {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (client, accepted) = tokio::join!(Connection::connect(&addr), listener.accept());
        let mut client = client.unwrap();
        let (mut accepted, _) = accepted.unwrap();

        assert_eq!(
            accepted.reconnect().await,
            Err(TransportError::NotReconnectable)
        );

        let (reconnected, again) = tokio::join!(client.reconnect(), listener.accept());
        reconnected.unwrap();
        let (mut again, _) = again.unwrap();
        client.send(b"hi").await.unwrap();
        assert_eq!(&again.receive(2).await.unwrap()[..], b"hi");
    }

    #[tokio::test]
    async fn send_after_disconnect_is_not_connected() {
        let (mut client, _server) = pair().await;
        client.disconnect().await;
        assert!(!client.is_connected());
        assert_eq!(client.send(b"x").await, Err(TransportError::NotConnected));
    }
}
