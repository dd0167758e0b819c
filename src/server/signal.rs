// Shutdown signal module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)
// Non-Unix platforms only get Ctrl+C.

use crate::logger;
use tokio::sync::watch;

/// Broadcast flag flipped once when the server should stop
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Receiver that observes the flag; `changed()` resolves on trigger
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Register OS signal handlers that trigger `shutdown`
///
/// Registration happens before returning, so failures surface to the caller.
#[cfg(unix)]
pub fn listen_for_signals(shutdown: ShutdownSignal) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    logger::log_debug(&format!(
        "[SIGNAL] Handlers registered (SIGTERM, SIGINT), pid {}",
        std::process::id()
    ));

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        logger::log_info(&format!("[SIGNAL] {name} received, shutting down"));
        shutdown.trigger();
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn listen_for_signals(shutdown: ShutdownSignal) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
            shutdown.trigger();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_wakes_subscribers() {
        let shutdown = ShutdownSignal::new();
        let mut rx = shutdown.subscribe();
        assert!(!shutdown.is_triggered());

        let trigger = shutdown.clone();
        tokio::spawn(async move { trigger.trigger() });

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
        assert!(shutdown.is_triggered());
    }
}
