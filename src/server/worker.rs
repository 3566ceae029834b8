//! Worker threads.
//!
//! Each worker owns an OS thread running a private current-thread tokio
//! runtime. Sockets arrive over a channel; the worker takes ownership of one
//! connection at a time and drives it through typed [`ConnectionEvent`]s until
//! it closes, then picks up the next one.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::thread::JoinHandle;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;
use tokio_rustls::TlsAcceptor;

use crate::http::connection::{Connection, ConnectionEvent, ConnectionSettings, Progress};
use crate::http::response::Response;
use crate::http::router::Responder;
use crate::log::Logger;

/// Externally visible worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Waiting for a connection or for the next event
    Idle = 0,
    /// Handling an event
    Busy = 1,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        if value == WorkerState::Busy as u8 {
            WorkerState::Busy
        } else {
            WorkerState::Idle
        }
    }
}

/// A freshly accepted socket plus what the worker needs to serve it.
pub(crate) struct Assignment {
    pub socket: std::net::TcpStream,
    pub peer: SocketAddr,
    pub responder: Arc<dyn Responder>,
    pub tls: Option<TlsAcceptor>,
}

enum Flow {
    Continue,
    Close,
}

/// Marks the worker Busy for as long as it lives.
struct BusyGuard<'a> {
    state: &'a AtomicU8,
}

impl<'a> BusyGuard<'a> {
    fn enter(state: &'a AtomicU8) -> Self {
        state.store(WorkerState::Busy as u8, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.store(WorkerState::Idle as u8, Ordering::SeqCst);
    }
}

/// The pool's handle onto a worker thread.
pub struct WorkerHandle {
    id: usize,
    state: Arc<AtomicU8>,
    handled: Arc<AtomicUsize>,
    sender: Option<UnboundedSender<Assignment>>,
    thread: Option<JoinHandle<()>>,
    logger: Logger,
}

impl WorkerHandle {
    /// Starts the worker thread.
    pub fn spawn(id: usize, settings: ConnectionSettings, logger: Logger) -> anyhow::Result<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let state = Arc::new(AtomicU8::new(WorkerState::Idle as u8));
        let handled = Arc::new(AtomicUsize::new(0));

        let worker = Worker {
            state: Arc::clone(&state),
            handled: Arc::clone(&handled),
            settings,
            logger: logger.clone(),
        };

        let thread = std::thread::Builder::new()
            .name(format!("webengine-worker-{}", id))
            .spawn(move || worker.run(receiver))?;

        Ok(Self {
            id,
            state,
            handled,
            sender: Some(sender),
            thread: Some(thread),
            logger,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of connections this worker has taken ownership of.
    pub fn connections_handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }

    /// Hands a socket to the worker thread.
    pub(crate) fn new_connection(&self, assignment: Assignment) {
        let peer = assignment.peer;
        let delivered = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(assignment).is_ok());

        if !delivered {
            self.logger.error(format!(
                "Worker {} is gone, dropping connection from {}",
                self.id, peer
            ));
        }
    }

    /// Closes the channel and waits for the thread to finish its current
    /// connection.
    pub fn join(mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                self.logger.error(format!("Worker {} panicked", self.id));
            }
        }
    }
}

struct Worker {
    state: Arc<AtomicU8>,
    handled: Arc<AtomicUsize>,
    settings: ConnectionSettings,
    logger: Logger,
}

impl Worker {
    fn run(self, receiver: UnboundedReceiver<Assignment>) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                self.logger.error(format!("Failed to start worker runtime: {}", e));
                return;
            }
        };

        runtime.block_on(self.event_loop(receiver));
        self.logger.verbose("Worker stopped");
    }

    async fn event_loop(&self, mut receiver: UnboundedReceiver<Assignment>) {
        while let Some(assignment) = receiver.recv().await {
            self.new_connection(assignment).await;
        }
    }

    fn busy(&self) -> BusyGuard<'_> {
        BusyGuard::enter(&self.state)
    }

    /// Takes ownership of the socket, then serves it until it closes.
    async fn new_connection(&self, assignment: Assignment) {
        let Assignment {
            socket,
            peer,
            responder,
            tls,
        } = assignment;

        let stream = {
            let _busy = self.busy();
            self.handled.fetch_add(1, Ordering::SeqCst);

            let registered = socket
                .set_nonblocking(true)
                .and_then(|()| TcpStream::from_std(socket));
            match registered {
                Ok(stream) => stream,
                Err(e) => {
                    self.logger.error(format!("Cannot take over connection from {}: {}", peer, e));
                    return;
                }
            }
        };

        self.logger.verbose(format!("Serving connection from {}", peer));

        match tls {
            None => {
                let conn = Connection::new(stream, peer, self.settings);
                self.serve(conn, responder.as_ref()).await;
            }
            Some(acceptor) => {
                let handshake = acceptor.accept(stream);
                let result = match self.settings.idle_timeout {
                    Some(limit) => match timeout(limit, handshake).await {
                        Ok(result) => result,
                        Err(_) => {
                            self.tls_failed(peer, "handshake timed out".to_string());
                            return;
                        }
                    },
                    None => handshake.await,
                };

                match result {
                    Ok(tls_stream) => {
                        self.logger.verbose(format!("TLS session established with {}", peer));
                        let conn = Connection::new(tls_stream, peer, self.settings);
                        self.serve(conn, responder.as_ref()).await;
                    }
                    Err(e) => self.tls_failed(peer, e.to_string()),
                }
            }
        }
    }

    /// The handshake never produced a connection; the socket is already gone.
    fn tls_failed(&self, peer: SocketAddr, detail: String) {
        let _busy = self.busy();
        self.logger.error(format!("TLS handshake with {} failed: {}", peer, detail));
    }

    async fn serve<S>(&self, mut conn: Connection<S>, responder: &dyn Responder)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let event = conn.next_event().await;
            if let Flow::Close = self.handle_event(&mut conn, event, responder).await {
                break;
            }
        }
    }

    async fn handle_event<S>(
        &self,
        conn: &mut Connection<S>,
        event: ConnectionEvent,
        responder: &dyn Responder,
    ) -> Flow
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let _busy = self.busy();

        let flow = match event {
            ConnectionEvent::DataAvailable(bytes) => {
                self.data_available(conn, &bytes, responder).await
            }
            ConnectionEvent::Closed => {
                self.logger.verbose(format!("{} closed the connection", conn.peer()));
                Flow::Close
            }
            ConnectionEvent::TimedOut => {
                self.logger.warning(format!("Connection from {} idle too long", conn.peer()));
                Flow::Close
            }
            ConnectionEvent::ReadFailed(detail) => {
                self.logger.warning(format!("Read from {} failed: {}", conn.peer(), detail));
                Flow::Close
            }
            ConnectionEvent::TlsError(detail) => {
                self.logger.error(format!("TLS error from {}: {}", conn.peer(), detail));
                Flow::Close
            }
        };

        if let Flow::Close = flow {
            // The peer may already be gone; nothing left to report to it.
            let _ = conn.shutdown().await;
        }

        flow
    }

    async fn data_available<S>(
        &self,
        conn: &mut Connection<S>,
        bytes: &[u8],
        responder: &dyn Responder,
    ) -> Flow
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let response = match conn.append(bytes, &self.logger) {
            Progress::Waiting => return Flow::Continue,
            Progress::Ready(request) => {
                let response = responder.respond(&request);
                self.logger.info(format!(
                    "{} {} {} -> {}",
                    conn.peer(),
                    request.method,
                    request.path,
                    response.status.as_u16()
                ));
                response
            }
            Progress::Reject(response) => {
                self.logger.info(format!(
                    "{} rejected -> {}",
                    conn.peer(),
                    response.status.as_u16()
                ));
                response
            }
        };

        self.write_response(conn, &response).await;
        Flow::Close
    }

    async fn write_response<S>(&self, conn: &mut Connection<S>, response: &Response)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if let Err(e) = conn.send(response).await {
            self.logger.warning(format!("Failed to write response to {}: {}", conn.peer(), e));
        }
    }
}
