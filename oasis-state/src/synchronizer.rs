//! Background poll synchronizer
//!
//! One tokio task per device polls `GETSTATUS` on a fixed interval and
//! publishes a whole new [`SessionState`] through a `watch` channel on every
//! poll. Poll failures are absorbed into the connectivity state machine and
//! never stop the loop; the connectivity transitions and the published state
//! are the only observable side effects.

use std::sync::Arc;
use std::time::Duration;

use oasis_api::{DeviceStatus, DeviceTransport};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::connectivity::{ConnectionTracker, Connectivity};
use crate::snapshot::DeviceSnapshot;

/// Poll loop configuration
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Fixed polling interval
    pub poll_interval: Duration,
    /// Failed polls tolerated while degraded before the session counts as
    /// disconnected
    pub grace_failures: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            grace_failures: 3,
        }
    }
}

/// Static device identity, read once after the first successful poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub serial_number: String,
    pub software_version: String,
}

/// The state one synchronizer publishes
///
/// Replaced whole on every poll; never mutated in place.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub connectivity: Connectivity,
    /// Last-known snapshot; `None` while disconnected (invalidated)
    pub snapshot: Option<DeviceSnapshot>,
    pub identity: Option<DeviceIdentity>,
}

impl SessionState {
    fn empty() -> Self {
        Self {
            connectivity: Connectivity::Disconnected,
            snapshot: None,
            identity: None,
        }
    }

    /// Device status, or `None` when the state is unknown
    ///
    /// A stale (disconnected) session has no status. That is distinct from
    /// [`DeviceStatus::Error`], which is a state the device itself reports.
    pub fn status(&self) -> Option<DeviceStatus> {
        self.snapshot.as_ref().map(|s| s.status)
    }

    /// Whether the device currently rejects mutating commands
    pub fn is_busy(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.busy)
    }
}

/// Handle to a running synchronizer task
///
/// Aborts the poll loop when dropped.
#[derive(Debug)]
pub struct SyncHandle {
    task: JoinHandle<()>,
    rx: watch::Receiver<SessionState>,
}

impl SyncHandle {
    /// Current published state
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Subscribe to state updates
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.rx.clone()
    }

    /// Stop the poll loop
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns poll loops for devices
pub struct Synchronizer;

impl Synchronizer {
    /// Start polling one device
    pub fn spawn(transport: Arc<dyn DeviceTransport>, config: SyncConfig) -> SyncHandle {
        let (tx, rx) = watch::channel(SessionState::empty());
        let task = tokio::spawn(run_poll_loop(transport, config, tx));
        SyncHandle { task, rx }
    }
}

async fn run_poll_loop(
    transport: Arc<dyn DeviceTransport>,
    config: SyncConfig,
    tx: watch::Sender<SessionState>,
) {
    let mut tracker = ConnectionTracker::new(config.grace_failures);
    let mut identity: Option<DeviceIdentity> = None;
    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("poll loop started");
    loop {
        interval.tick().await;
        match transport.status().await {
            Ok(update) => {
                if identity.is_none() {
                    identity = fetch_identity(transport.as_ref()).await;
                }
                if let Some(t) = tracker.record_success() {
                    info!("connectivity {:?} -> {:?}", t.from, t.to);
                }
                tx.send_replace(SessionState {
                    connectivity: tracker.state(),
                    snapshot: Some(DeviceSnapshot::from(update)),
                    identity: identity.clone(),
                });
            }
            Err(e) => {
                debug!("poll failed: {e}");
                if let Some(t) = tracker.record_failure() {
                    warn!("connectivity {:?} -> {:?}", t.from, t.to);
                }
                let snapshot = if tracker.state() == Connectivity::Disconnected {
                    None
                } else {
                    tx.borrow().snapshot.clone()
                };
                tx.send_replace(SessionState {
                    connectivity: tracker.state(),
                    snapshot,
                    identity: identity.clone(),
                });
            }
        }
    }
}

async fn fetch_identity(transport: &dyn DeviceTransport) -> Option<DeviceIdentity> {
    let serial_number = match transport.serial_number().await {
        Ok(serial) => serial,
        Err(e) => {
            debug!("identity read failed: {e}");
            return None;
        }
    };
    let software_version = match transport.software_version().await {
        Ok(version) => version,
        Err(e) => {
            debug!("identity read failed: {e}");
            return None;
        }
    };
    Some(DeviceIdentity {
        serial_number,
        software_version,
    })
}
