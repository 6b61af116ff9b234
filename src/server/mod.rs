// Server module entry point
// Binds the application listener and runs the accept loop

mod connection;
mod listener;
mod signal;

// `loop` is a keyword, so the file is mounted as server_loop
#[path = "loop.rs"]
mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::Result;
use crate::handler::Dispatcher;

pub use connection::ConnectionSettings;
pub use listener::create_listener;
pub use signal::shutdown_signal;

/// A bound application listener plus the dispatcher it serves
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    settings: ConnectionSettings,
}

impl Server {
    /// Bind `server.host:server.port`. Must be called inside a Tokio runtime.
    pub fn bind(config: &Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let addr = config.socket_addr()?;
        let listener = create_listener(addr, config.server.backlog)?;

        let settings = ConnectionSettings {
            dispatcher,
            active: Arc::new(AtomicUsize::new(0)),
            max_connections: config.performance.max_connections,
            keep_alive: config.performance.keep_alive,
            timeout: config.connection_timeout(),
        };
        Ok(Self { listener, settings })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared counter of connections currently being served
    pub fn active_connections(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.settings.active)
    }

    /// Accept connections until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        server_loop::run_server_loop(self.listener, self.settings, shutdown).await;
    }
}
