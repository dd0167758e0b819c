// Accept loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Serve `listener` until `shutdown` triggers.
///
/// Connections run as local tasks, so this must be driven inside a
/// `tokio::task::LocalSet`. After shutdown the listener is closed and
/// in-flight connections get `performance.shutdown_timeout` seconds.
pub async fn run(listener: TcpListener, state: Arc<AppState>, shutdown: ShutdownSignal) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let mut stop = shutdown.subscribe();

    if !shutdown.is_triggered() {
        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            accept_connection(
                                stream,
                                peer_addr,
                                &state,
                                &active_connections,
                                &shutdown,
                            );
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                        }
                    }
                }
                _ = stop.changed() => break,
            }
        }
    }

    drop(listener);
    drain_connections(
        &active_connections,
        Duration::from_secs(state.config.performance.shutdown_timeout),
    )
    .await;
}

/// Wait for active connections to reach zero, at most `grace`
async fn drain_connections(active: &AtomicUsize, grace: Duration) {
    let remaining = active.load(Ordering::SeqCst);
    if remaining == 0 {
        logger::log_info("Listener closed, no active connections");
        return;
    }

    logger::log_info(&format!(
        "Listener closed, waiting up to {}s for {remaining} connection(s)",
        grace.as_secs()
    ));

    let deadline = tokio::time::Instant::now() + grace;
    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {} connection(s) still open",
                active.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    logger::log_info("All connections drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn fetch_raw(addr: std::net::SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_site_until_shutdown() {
        let site = tempfile::tempdir().unwrap();
        std::fs::write(site.path().join("index.html"), "welcome home").unwrap();
        std::fs::create_dir(site.path().join("pages")).unwrap();
        std::fs::write(site.path().join("pages/about.html"), "about us").unwrap();
        std::fs::write(site.path().join("pages/rules and terms.html"), "rules").unwrap();

        let overrides = Overrides {
            root: Some(site.path().to_str().unwrap().to_string()),
            ..Overrides::default()
        };
        let mut config = Config::load_from("/nonexistent/site-edge", &overrides).unwrap();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(&config));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(run(listener, state, shutdown.clone()));

                let home = fetch_raw(addr, "/").await;
                assert!(home.starts_with("HTTP/1.1 200 OK"), "{home}");
                assert!(home.ends_with("welcome home"));

                let redirect = fetch_raw(addr, "/about").await;
                assert!(redirect.starts_with("HTTP/1.1 301"), "{redirect}");
                assert!(redirect.to_ascii_lowercase().contains("location: /pages/about\r\n"));

                let page = fetch_raw(addr, "/pages/about").await;
                assert!(page.ends_with("about us"), "{page}");

                let encoded = fetch_raw(addr, "/pages/rules%20and%20terms").await;
                assert!(encoded.ends_with("rules"), "{encoded}");

                let missing = fetch_raw(addr, "/pages/nothing-here").await;
                assert!(missing.starts_with("HTTP/1.1 200 OK"));
                assert!(missing.ends_with("welcome home"));

                shutdown.trigger();
                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .unwrap()
                    .unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let active = AtomicUsize::new(0);
        tokio::time::timeout(
            Duration::from_secs(1),
            drain_connections(&active, Duration::from_secs(30)),
        )
        .await
        .unwrap();
    }
}
