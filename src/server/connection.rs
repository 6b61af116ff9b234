// Connection handling module
// Accepts a single TCP connection and serves it with the dispatcher

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::handler::Dispatcher;
use crate::logger;

/// Everything a connection task needs, shared across all connections
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub dispatcher: Arc<Dispatcher>,
    pub active: Arc<AtomicUsize>,
    pub max_connections: Option<u64>,
    pub keep_alive: bool,
    /// Whole-connection deadline; `None` disables it
    pub timeout: Option<Duration>,
}

/// Accept a connection, enforcing the connection limit.
///
/// Connections over the limit are dropped without a response.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, settings: &ConnectionSettings) {
    // Increment first, then check, so concurrent accepts cannot both slip under the limit
    let prev_count = settings.active.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = settings.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            settings.active.fetch_sub(1, Ordering::SeqCst);
            logger::log_connection_rejected(&peer_addr, max_conn);
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY for {peer_addr}: {e}"));
    }

    handle_connection(stream, peer_addr, settings.clone());
}

/// Serve one connection on its own task, decrementing the counter when done
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, settings: ConnectionSettings) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let dispatcher = Arc::clone(&settings.dispatcher);

        let service = service_fn(move |req: Request<Incoming>| {
            let dispatcher = Arc::clone(&dispatcher);
            async move { Ok::<_, Infallible>(dispatcher.dispatch(req, Some(peer_addr)).await) }
        });

        let mut builder = http1::Builder::new();
        builder.keep_alive(settings.keep_alive);
        let conn = builder.serve_connection(io, service);

        let result = match settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, conn).await {
                Ok(result) => result,
                Err(_) => {
                    logger::log_connection_timeout(&peer_addr);
                    Ok(())
                }
            },
            None => conn.await,
        };
        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        settings.active.fetch_sub(1, Ordering::SeqCst);
    });
}
