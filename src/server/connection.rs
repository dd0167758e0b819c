// Connection handling module
// Accepts a TCP connection and serves it with the edge request handler

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection, enforcing `performance.max_connections`.
///
/// The counter is incremented before the limit check so concurrent accepts
/// cannot both slip under the limit.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: &ShutdownSignal,
) {
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        shutdown.clone(),
    );
}

/// Serve one connection on a local task.
///
/// HTTP/1.1 with keep-alive when configured. The whole connection is bounded
/// by `max(read_timeout, write_timeout)`. On shutdown the connection finishes
/// its current request and closes.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    shutdown: ShutdownSignal,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        let deadline = tokio::time::sleep(timeout_duration);
        tokio::pin!(deadline);

        let mut stop = shutdown.subscribe();
        let mut draining = false;

        loop {
            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }
                () = &mut deadline => {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} timed out after {} seconds",
                        timeout_duration.as_secs()
                    ));
                    break;
                }
                _ = stop.changed(), if !draining => {
                    draining = true;
                    conn.as_mut().graceful_shutdown();
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpListener, TcpStream};

    #[tokio::test]
    async fn test_rejects_over_max_connections() {
        let mut config = Config::load_from("/nonexistent/site-edge", &Overrides::default()).unwrap();
        config.performance.max_connections = Some(1);
        let state = Arc::new(AppState::new(&config));
        let conn_counter = Arc::new(AtomicUsize::new(1));
        let shutdown = ShutdownSignal::new();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, peer_addr) = listener.accept().await.unwrap();

        // Rejection happens before any task is spawned, no LocalSet needed
        accept_connection(stream, peer_addr, &state, &conn_counter, &shutdown);
        assert_eq!(conn_counter.load(Ordering::SeqCst), 1);

        let mut buf = [0u8; 16];
        let read = tokio::time::timeout(Duration::from_secs(5), client.read(&mut buf))
            .await
            .unwrap()
            .unwrap_or(0);
        assert_eq!(read, 0);
    }
}
