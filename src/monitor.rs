//! The published battery state and the refresh handoff.
//!
//! Acquisition runs on a short-lived worker thread so the UI thread never blocks
//! on the OS query. The worker hands its result back over a channel, and only the
//! owner of the [`BatteryMonitor`] applies it, from [`BatteryMonitor::poll`] or
//! [`BatteryMonitor::wait`]. At most one refresh is in flight; requests made in
//! the meantime collapse into a single follow-up refresh.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use tracing::{debug, info, warn};

use crate::error::{AcquireError, AcquireResult};
use crate::models::BatterySnapshot;
use crate::normalize::acquire;
use crate::source::PowerSource;

type Notifier = Arc<dyn Fn() + Send + Sync>;

pub struct BatteryMonitor {
    /// Where every refresh reads from, chosen at startup
    source: Arc<dyn PowerSource>,

    /// Last successful reading, kept across failed refreshes
    snapshot: Option<BatterySnapshot>,

    /// Error from the most recent refresh, cleared on success
    last_error: Option<AcquireError>,

    /// Result channel of the refresh currently running, if any
    in_flight: Option<Receiver<AcquireResult<BatterySnapshot>>>,

    /// A refresh was requested while another was running
    pending: bool,

    /// Called from the worker once its result is ready
    notify: Option<Notifier>,
}

impl BatteryMonitor {
    pub fn new(source: Arc<dyn PowerSource>) -> Self {
        Self {
            source,
            snapshot: None,
            last_error: None,
            in_flight: None,
            pending: false,
            notify: None,
        }
    }

    /// Registers a callback run on the worker thread after each refresh finishes.
    /// The GUI uses it to wake the event loop.
    pub fn set_notifier(&mut self, notify: impl Fn() + Send + Sync + 'static) {
        self.notify = Some(Arc::new(notify));
    }

    /// Starts a refresh, or queues one if a refresh is already running.
    pub fn refresh(&mut self) {
        if self.in_flight.is_some() {
            if !self.pending {
                debug!("refresh already in flight, coalescing request");
            }
            self.pending = true;
            return;
        }
        self.start();
    }

    fn start(&mut self) {
        let (tx, rx) = bounded(1);
        let source = Arc::clone(&self.source);
        let notify = self.notify.clone();

        debug!(source = source.name(), "starting battery refresh");
        let spawned = thread::Builder::new()
            .name("battery-refresh".into())
            .spawn(move || {
                let result = acquire(source.as_ref());
                // The monitor may have been dropped; nothing left to publish to.
                let _ = tx.send(result);
                if let Some(notify) = notify {
                    notify();
                }
            });

        match spawned {
            Ok(_) => self.in_flight = Some(rx),
            Err(e) => self.apply(Err(AcquireError::unavailable(format!(
                "failed to start refresh worker: {e}"
            )))),
        }
    }

    /// Applies a finished refresh if one is ready. Returns `true` when the
    /// published state changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.in_flight else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(worker_lost()),
        };
        self.complete(result);
        true
    }

    /// Blocks until the running refresh, and any follow-up it triggers, is applied.
    pub fn wait(&mut self) {
        while let Some(rx) = &self.in_flight {
            let result = rx.recv().unwrap_or_else(|_| Err(worker_lost()));
            self.complete(result);
        }
    }

    fn complete(&mut self, result: AcquireResult<BatterySnapshot>) {
        self.in_flight = None;
        self.apply(result);

        if self.pending {
            self.pending = false;
            self.start();
        }
    }

    fn apply(&mut self, result: AcquireResult<BatterySnapshot>) {
        match result {
            Ok(snapshot) => {
                info!(
                    charge = %snapshot.percentage(),
                    health = snapshot.health(),
                    state = snapshot.charging_status_description(),
                    "battery refreshed"
                );
                self.snapshot = Some(snapshot);
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "battery refresh failed, keeping previous reading");
                self.last_error = Some(e);
            }
        }
    }

    /// The most recent successful reading.
    pub fn snapshot(&self) -> Option<&BatterySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&AcquireError> {
        self.last_error.as_ref()
    }

    /// User-facing message for the last failed refresh.
    pub fn error_message(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(AcquireError::user_message)
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }
}

fn worker_lost() -> AcquireError {
    AcquireError::unavailable("refresh worker exited without a result")
}
