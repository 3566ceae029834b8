use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::Config;
use crate::http::parser::{assemble, Assembly};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::log::Logger;

const READ_CHUNK: usize = 4096;

/// Limits applied to every connection a worker owns.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Close the connection after this long without incoming bytes
    pub idle_timeout: Option<Duration>,
    /// Largest accumulation buffer before the request is refused with 413
    pub max_request_bytes: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConnectionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            idle_timeout: cfg.idle_timeout(),
            max_request_bytes: cfg.max_request_bytes,
        }
    }
}

/// Something that happened on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// New bytes arrived from the peer
    DataAvailable(Bytes),
    /// The peer closed its side
    Closed,
    /// Nothing arrived within the idle timeout
    TimedOut,
    /// The socket failed while reading
    ReadFailed(String),
    /// TLS handshake or verification failed
    TlsError(String),
}

/// Where request assembly stands after new bytes were appended.
#[derive(Debug)]
pub enum Progress {
    /// Keep reading
    Waiting,
    /// A complete request, ready for routing
    Ready(Request),
    /// Refuse the request without routing it
    Reject(Response),
}

/// A client connection: the byte stream plus everything received but not
/// yet turned into a request.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    buffer: BytesMut,
    read_buf: BytesMut,
    settings: ConnectionSettings,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            read_buf: BytesMut::with_capacity(READ_CHUNK),
            settings,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Bytes received but not yet consumed into a request.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Waits for the next thing to happen on the socket.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        self.read_buf.reserve(READ_CHUNK);
        let read = self.stream.read_buf(&mut self.read_buf);

        let result = match self.settings.idle_timeout {
            Some(limit) => match timeout(limit, read).await {
                Ok(result) => result,
                Err(_) => return ConnectionEvent::TimedOut,
            },
            None => read.await,
        };

        match result {
            Ok(0) => ConnectionEvent::Closed,
            Ok(_) => ConnectionEvent::DataAvailable(self.read_buf.split().freeze()),
            // rustls reports bad records and alerts as InvalidData
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                ConnectionEvent::TlsError(e.to_string())
            }
            Err(e) => ConnectionEvent::ReadFailed(e.to_string()),
        }
    }

    /// Appends `bytes` and checks whether a whole request is buffered.
    ///
    /// A ready request drains the buffer; at most one request is in flight.
    pub fn append(&mut self, bytes: &[u8], logger: &Logger) -> Progress {
        self.buffer.extend_from_slice(bytes);

        if self.buffer.len() > self.settings.max_request_bytes {
            logger.warning(format!(
                "Request from {} exceeds {} bytes",
                self.peer, self.settings.max_request_bytes
            ));
            self.buffer.clear();
            return Progress::Reject(Response::payload_too_large());
        }

        match assemble(&self.buffer, logger) {
            Assembly::Incomplete => Progress::Waiting,
            Assembly::Complete(request) => {
                self.buffer.clear();
                Progress::Ready(request)
            }
            Assembly::Overrun(request) => {
                logger.warning(format!(
                    "Body from {} is longer than Content-Length {:?}",
                    self.peer,
                    request.content_length()
                ));
                self.buffer.clear();
                Progress::Reject(Response::bad_request())
            }
        }
    }

    pub async fn send(&mut self, response: &Response) -> anyhow::Result<()> {
        let mut writer = ResponseWriter::new(response);
        writer.write_to_stream(&mut self.stream).await
    }

    /// Drops buffered state and shuts the write side down.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.buffer.clear();
        self.stream.shutdown().await?;
        Ok(())
    }
}
