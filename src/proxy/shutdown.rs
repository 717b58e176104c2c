use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;

pub struct ShutdownManager {
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Resolves on Ctrl-C, SIGTERM, or [`signal_shutdown`](Self::signal_shutdown).
    pub async fn wait_for_shutdown(&self) -> std::io::Result<()> {
        if self.is_shutting_down() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
                _ = self.notify.notified() => {},
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = self.notify.notified() => {},
            }
        }

        self.shutdown.store(true, Ordering::SeqCst);
        tracing::info!("Shutting down gracefully...");
        Ok(())
    }

    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    pub fn increment_connections(&self) {
        self.active_connections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement_connections(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    pub async fn wait_for_connections(&self, timeout: Duration) {
        tracing::info!(active = self.active_connections(), "Waiting for active connections");

        let start = tokio::time::Instant::now();

        while start.elapsed() < timeout {
            if self.active_connections() == 0 {
                tracing::info!("Server stopped");
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tracing::warn!(
            remaining = self.active_connections(),
            "Forced shutdown after timeout"
        );
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_wakes_waiter() {
        let manager = Arc::new(ShutdownManager::new());
        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.wait_for_shutdown().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.signal_shutdown();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter did not wake")
            .unwrap()
            .unwrap();
        assert!(manager.is_shutting_down());
    }

    #[tokio::test]
    async fn wait_for_connections_returns_when_idle() {
        let manager = ShutdownManager::new();
        manager.increment_connections();
        manager.decrement_connections();
        tokio::time::timeout(
            Duration::from_millis(500),
            manager.wait_for_connections(Duration::from_secs(5)),
        )
        .await
        .expect("should not wait with zero connections");
    }
}
