//! Periodic connectivity probing.
//!
//! [`Heartbeat`] owns a background task that calls `GET /ping` on a fixed
//! interval and publishes the result over a `watch` channel. Pausing is
//! [`Heartbeat::stop`], resuming is [`Heartbeat::start`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::http::TimesheetClient;

/// Interval between probes used by [`Heartbeat::with_default_interval`].
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(120);

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Last known reachability of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// No probe has completed yet.
    Unknown,
    /// The server answered and its storage is up.
    Connected,
    /// The server did not answer, or answered without storage.
    Disconnected,
}

/// Background connectivity monitor with explicit start and stop.
pub struct Heartbeat {
    client: Arc<TimesheetClient>,
    interval: Duration,
    status: Arc<watch::Sender<Connectivity>>,
    task_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
}

impl Heartbeat {
    /// Creates a stopped heartbeat probing every `interval`.
    pub fn new(client: Arc<TimesheetClient>, interval: Duration) -> Self {
        let (status, _) = watch::channel(Connectivity::Unknown);
        Self {
            client,
            interval,
            status: Arc::new(status),
            task_handle: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Creates a stopped heartbeat probing every two minutes.
    pub fn with_default_interval(client: Arc<TimesheetClient>) -> Self {
        Self::new(client, DEFAULT_HEARTBEAT_INTERVAL)
    }

    /// Receiver notified on every connectivity change.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.status.subscribe()
    }

    /// Current connectivity.
    pub fn status(&self) -> Connectivity {
        *self.status.borrow()
    }

    /// Starts probing; the first probe runs immediately.
    ///
    /// Returns false when already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        self.cancellation = CancellationToken::new();
        let cancel = self.cancellation.clone();
        let client = Arc::clone(&self.client);
        let status = Arc::clone(&self.status);
        let interval = self.interval;

        info!(interval_secs = interval.as_secs(), "Starting heartbeat");
        self.task_handle = Some(tokio::spawn(async move {
            heartbeat_worker(client, status, interval, cancel).await;
        }));
        true
    }

    /// Stops probing and waits for the worker to finish.
    pub async fn stop(&mut self) {
        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "heartbeat task join failed"),
                Err(_) => warn!("heartbeat shutdown timed out"),
            }
        }
        info!("Heartbeat stopped");
    }

    /// Returns true while the worker is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some() && !self.cancellation.is_cancelled()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

async fn heartbeat_worker(
    client: Arc<TimesheetClient>,
    status: Arc<watch::Sender<Connectivity>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Heartbeat worker shutting down");
                break;
            }
            _ = ticker.tick() => {
                let probe = tokio::time::timeout(PROBE_TIMEOUT, client.ping()).await;
                let next = match probe {
                    Ok(Ok(true)) => Connectivity::Connected,
                    Ok(Ok(false)) => Connectivity::Disconnected,
                    Ok(Err(e)) => {
                        warn!(error = %e, "Connectivity probe failed");
                        Connectivity::Disconnected
                    }
                    Err(_) => {
                        warn!("Connectivity probe timed out");
                        Connectivity::Disconnected
                    }
                };

                status.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    info!(previous = ?current, next = ?next, "Connectivity changed");
                    *current = next;
                    true
                });
            }
        }
    }
}
