use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use crate::config::Config;
use crate::http::connection::ConnectionSettings;
use crate::http::router::Responder;
use crate::log::Logger;
use crate::server::pool::Pool;
use crate::server::tls::load_tls_acceptor;
use crate::server::worker::Assignment;

/// Pause after a failed accept, so descriptor exhaustion does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections and spreads them over the worker pool.
pub struct Server {
    pool: Pool,
    responder: Option<Arc<dyn Responder>>,
    tls: Option<TlsAcceptor>,
    logger: Logger,
}

impl Server {
    /// Creates the server and starts its worker threads.
    pub fn new(
        workers: usize,
        settings: ConnectionSettings,
        logger: Logger,
    ) -> anyhow::Result<Self> {
        let pool = Pool::new(
            workers,
            settings,
            logger.scoped(format!("{}:Pool", logger.component())),
        )?;
        Ok(Self {
            pool,
            responder: None,
            tls: None,
            logger,
        })
    }

    /// Creates the server described by `cfg`, loading TLS material if any.
    pub fn from_config(cfg: &Config, logger: Logger) -> anyhow::Result<Self> {
        cfg.validate()?;
        let mut server = Self::new(cfg.workers, ConnectionSettings::from(cfg), logger)?;
        if let Some(tls) = &cfg.tls {
            server.set_tls(load_tls_acceptor(&tls.cert_path, &tls.key_path)?);
        }
        Ok(server)
    }

    pub fn set_responder(&mut self, responder: Arc<dyn Responder>) {
        self.responder = Some(responder);
    }

    /// Every connection accepted from now on is TLS-wrapped with `acceptor`.
    pub fn set_tls(&mut self, acceptor: TlsAcceptor) {
        self.tls = Some(acceptor);
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Binds `address:port` and serves until the accept loop fails.
    pub async fn listen(&self, address: &str, port: u16) -> anyhow::Result<()> {
        let listener = TcpListener::bind((address, port))
            .await
            .with_context(|| format!("failed to bind {}:{}", address, port))?;
        self.serve(listener).await
    }

    /// Binds a `host:port` string, as found in the config.
    pub async fn listen_on(&self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let responder = self
            .responder
            .clone()
            .context("no responder configured")?;

        self.logger.info(format!(
            "Listening on {}{}",
            listener.local_addr()?,
            if self.tls.is_some() { " (TLS)" } else { "" }
        ));

        loop {
            match listener.accept().await {
                Ok((socket, peer)) => self.dispatch(socket, peer, &responder),
                Err(e) => {
                    self.logger.warning(format!("Accept failed: {}", e));
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    fn dispatch(&self, socket: TcpStream, peer: SocketAddr, responder: &Arc<dyn Responder>) {
        self.logger.verbose(format!("Accepted connection from {}", peer));

        let socket = match socket.into_std() {
            Ok(socket) => socket,
            Err(e) => {
                self.logger.error(format!("Cannot detach connection from {}: {}", peer, e));
                return;
            }
        };

        self.pool.assign(Assignment {
            socket,
            peer,
            responder: Arc::clone(responder),
            tls: self.tls.clone(),
        });
    }

    /// Joins all worker threads. Connections still open are served to
    /// completion first.
    ///
    /// Blocks the calling thread, possibly for a whole idle timeout per open
    /// connection; call it from `spawn_blocking` inside a runtime.
    pub fn shutdown(self) {
        self.pool.shutdown();
    }
}
