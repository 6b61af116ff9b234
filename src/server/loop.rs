// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use tokio::net::TcpListener;

use super::connection::{accept_connection, ConnectionSettings};
use crate::logger;

pub async fn run_server_loop<F>(listener: TcpListener, settings: ConnectionSettings, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &settings),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    logger::log_server_stopped();
}
