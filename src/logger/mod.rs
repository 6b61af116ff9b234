//! Logger module
//!
//! Provides logging for the dispatcher daemon:
//! - `tracing` subscriber setup (stderr or an append-mode file)
//! - Server lifecycle and per-request event helpers
//! - Access logging with multiple formats

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use hyper::{Method, Uri};
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, FormError, Result};

const ACCESS_TARGET: &str = "dispatchd::access";

/// Install the global tracing subscriber
///
/// Should be called once at application startup. `RUST_LOG` overrides
/// `logging.level` when set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Logging(format!("invalid level {:?}: {e}", config.level)))?;

    let layer = match config.log_file.as_deref() {
        Some(path) => {
            let file = writer::open_log_file(path)?;
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .boxed()
        }
        None => fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(%addr, "dispatchd listening on http://{addr}");
    tracing::info!(
        level = %config.logging.level,
        access_log = config.logging.access_log,
        format = %config.logging.access_log_format,
        "logging configured"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!(workers, "worker threads");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!(max, "connection limit");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!(path = %path, "log file");
    }
}

pub fn log_server_stopped() {
    tracing::info!("server stopped");
}

pub fn log_route_registered(path: &str, method: &Method) {
    tracing::info!("add route: {path} {method}");
}

/// Route table in registration order
pub fn log_routes(routes: &[(String, Method)]) {
    for (path, method) in routes {
        tracing::debug!(%method, path = %path, "route");
    }
    tracing::info!(count = routes.len(), "routes ready");
}

pub fn log_request(remote_addr: Option<SocketAddr>, method: &Method, uri: &Uri) {
    let path = uri.path();
    match remote_addr {
        Some(remote) => tracing::debug!(%remote, %method, %uri, path, "request"),
        None => tracing::debug!(%method, %uri, path, "request"),
    }
}

pub fn log_parse_form_failed(uri: &Uri, err: &FormError) {
    tracing::warn!(%uri, error = %err, "failed to parse request parameters");
}

pub fn log_route_not_found(path: &str, method: &Method) {
    tracing::warn!(%method, path, "no route registered");
}

pub fn log_respond_failed(uri: &Uri, err: &Error) {
    tracing::error!(%uri, error = %err, "failed to encode response");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::trace!(%peer_addr, "connection accepted");
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, limit: u64) {
    tracing::warn!(%peer_addr, limit, "connection limit reached, dropping connection");
}

pub fn log_connection_timeout(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection timed out");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
