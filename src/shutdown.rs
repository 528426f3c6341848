//! Graceful shutdown coordination.
//!
//! SIGINT or SIGTERM cancels a shared [`CancellationToken`]. The HTTP server
//! stops accepting connections when the token fires and is given
//! [`ShutdownConfig::drain_timeout`] to finish in-flight requests before it
//! is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use parking_lot::RwLock;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Time in-flight requests get after the signal
    pub drain_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl ShutdownConfig {
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    Draining,
    Complete,
    /// Drain timed out with requests still active
    Forced,
}

impl std::fmt::Display for ShutdownPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShutdownPhase::Running => "running",
            ShutdownPhase::Draining => "draining",
            ShutdownPhase::Complete => "complete",
            ShutdownPhase::Forced => "forced",
        })
    }
}

pub struct ShutdownCoordinator {
    config: ShutdownConfig,
    phase: RwLock<ShutdownPhase>,
    shutdown_token: CancellationToken,
    active_requests: Arc<AtomicU64>,
}

impl ShutdownCoordinator {
    pub fn new(config: ShutdownConfig) -> Self {
        Self {
            config,
            phase: RwLock::new(ShutdownPhase::Running),
            shutdown_token: CancellationToken::new(),
            active_requests: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn phase(&self) -> ShutdownPhase {
        *self.phase.read()
    }

    /// Counts a request as in flight until the guard drops.
    pub fn track_request(&self) -> InFlightGuard {
        self.active_requests.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            active: self.active_requests.clone(),
        }
    }

    pub fn active_request_count(&self) -> u64 {
        self.active_requests.load(Ordering::Relaxed)
    }

    /// Starts shutdown without waiting for a signal.
    pub fn trigger(&self) {
        if !self.shutdown_token.is_cancelled() {
            *self.phase.write() = ShutdownPhase::Draining;
            self.shutdown_token.cancel();
        }
    }

    /// Resolves on SIGINT or SIGTERM, then triggers shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    error!(error = %err, "failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, shutting down"),
            _ = terminate => info!("received SIGTERM, shutting down"),
            _ = self.shutdown_token.cancelled() => {}
        }
        self.trigger();
    }

    /// Resolves once shutdown was triggered and the drain window elapsed.
    pub async fn drain_deadline(&self) {
        self.shutdown_token.cancelled().await;
        sleep(self.config.drain_timeout).await;
    }

    /// Waits for in-flight requests to finish, bounded by the drain timeout.
    /// Returns the final phase.
    pub async fn drain(&self) -> ShutdownPhase {
        let deadline = Instant::now() + self.config.drain_timeout;
        loop {
            let active = self.active_request_count();
            if active == 0 {
                info!("all in-flight requests completed");
                *self.phase.write() = ShutdownPhase::Complete;
                break;
            }
            if Instant::now() >= deadline {
                warn!(remaining_requests = active, "drain timeout reached");
                *self.phase.write() = ShutdownPhase::Forced;
                break;
            }
            debug!(active_requests = active, "waiting for requests to complete");
            sleep(self.config.poll_interval).await;
        }
        self.phase()
    }
}

pub struct InFlightGuard {
    active: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }
}
