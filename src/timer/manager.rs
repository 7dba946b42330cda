//! Timer registry bridging session callbacks to the platform timer primitive.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::core::constants::TIMER_ID_INCREMENT;
use crate::core::{TimerError, TimerId, TimerInterface};

/// Callback run once when a timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// A pending timer.
struct TimerEntry {
    label: String,
    callback: TimerCallback,
}

/// State guarded by the manager lock.
#[derive(Default)]
struct Registry {
    timers: BTreeMap<TimerId, TimerEntry>,
    next_id: u64,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Manages the outstanding timers of a session.
///
/// Arming and disarming is delegated to a [`TimerInterface`]; the manager
/// keeps the id → callback mapping and guarantees that:
///
/// - ids are issued monotonically and never reused while pending
/// - a callback runs at most once
/// - a timer cancelled before its expiry is dispatched never runs
/// - callbacks run without the internal lock held, so they may start or
///   cancel timers themselves
pub struct TimerManager {
    timer_interface: Arc<dyn TimerInterface>,
    registry: Arc<Mutex<Registry>>,
}

impl TimerManager {
    /// Create a manager and register its expiry hook with the primitive.
    pub fn new(timer_interface: Arc<dyn TimerInterface>) -> Self {
        let registry = Arc::new(Mutex::new(Registry::default()));

        // The hook only holds a weak reference; expiries delivered after the
        // manager is gone are dropped.
        let weak = Arc::downgrade(&registry);
        timer_interface.register_callback(Box::new(move |timer_id| match weak.upgrade() {
            Some(registry) => timer_expiry(&registry, timer_id),
            None => debug!("Timer {} expired after its manager was dropped", timer_id),
        }));

        Self {
            timer_interface,
            registry,
        }
    }

    /// Start a timer that runs `callback` after `duration`.
    ///
    /// Returns the id to pass to [`cancel_timer`](Self::cancel_timer). If the
    /// primitive fails to arm the timer nothing is registered and its error is
    /// returned unchanged.
    pub fn start_timer<F>(
        &self,
        duration: Duration,
        callback: F,
        label: &str,
    ) -> Result<TimerId, TimerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut registry = lock(&self.registry);
        let timer_id = TimerId::new(registry.next_id);
        registry.next_id += TIMER_ID_INCREMENT;

        self.timer_interface.start_timer(timer_id, duration)?;

        info!(
            "Starting timer {} of {:?} with id: {}",
            label, duration, timer_id
        );
        registry.timers.insert(
            timer_id,
            TimerEntry {
                label: label.to_string(),
                callback: Box::new(callback),
            },
        );
        Ok(timer_id)
    }

    /// Cancel a pending timer. Unknown ids are logged and ignored.
    ///
    /// Returns `true` if the timer was still pending, in which case its
    /// callback will never run. `false` means the id is unknown or its expiry
    /// was already dispatched.
    pub fn cancel_timer(&self, timer_id: TimerId) -> bool {
        info!("Cancelling timer with id: {}", timer_id);
        let mut registry = lock(&self.registry);
        self.timer_interface.cancel_timer(timer_id);
        match registry.timers.remove(&timer_id) {
            Some(entry) => {
                info!("Cancelled timer {} with id: {}", entry.label, timer_id);
                true
            }
            None => {
                warn!("Cancelled unknown timer with id: {}", timer_id);
                false
            }
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn num_active_timers(&self) -> usize {
        lock(&self.registry).timers.len()
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        lock(&self.registry).timers.clear();
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("active_timers", &self.num_active_timers())
            .finish()
    }
}

/// Dispatch an expiry: take the entry under the lock, run it outside.
fn timer_expiry(registry: &Mutex<Registry>, timer_id: TimerId) {
    let entry = {
        let mut registry = lock(registry);
        match registry.timers.remove(&timer_id) {
            Some(entry) => entry,
            None => {
                error!("Timer expiry for timer_id: {} that is not running", timer_id);
                return;
            }
        }
    };

    info!(
        "Calling callback for timer {} with id: {}",
        entry.label, timer_id
    );
    (entry.callback)();
}
