//! Timer primitive backed by the tokio runtime.
//!
//! Each armed timer is a spawned task that sleeps for its duration and then
//! reports the expiry through the registered callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{ExpiryCallback, TimerError, TimerId, TimerInterface};

type TaskMap = HashMap<TimerId, JoinHandle<()>>;

fn lock(tasks: &Mutex<TaskMap>) -> MutexGuard<'_, TaskMap> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`TimerInterface`] implementation that runs timers as tokio tasks.
pub struct TokioTimer {
    handle: Handle,
    callback: Arc<OnceLock<ExpiryCallback>>,
    tasks: Arc<Mutex<TaskMap>>,
}

impl TokioTimer {
    /// Create a timer on the runtime of the calling context.
    pub fn new() -> Result<Self, TimerError> {
        let handle = Handle::try_current().map_err(|_| TimerError::NoRuntime)?;
        Ok(Self::with_handle(handle))
    }

    /// Create a timer that spawns onto the given runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            callback: Arc::new(OnceLock::new()),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        lock(&self.tasks)
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl TimerInterface for TokioTimer {
    fn register_callback(&self, callback: ExpiryCallback) {
        if self.callback.set(callback).is_err() {
            warn!("Timer expiry callback already registered, ignoring");
        }
    }

    fn start_timer(&self, id: TimerId, duration: Duration) -> Result<(), TimerError> {
        let mut tasks = lock(&self.tasks);
        if tasks.get(&id).is_some_and(|task| !task.is_finished()) {
            return Err(TimerError::AlreadyRunning(id));
        }

        let callback = Arc::clone(&self.callback);
        let task_map = Arc::clone(&self.tasks);
        let task = self.handle.spawn(async move {
            tokio::time::sleep(duration).await;
            lock(&task_map).remove(&id);
            match callback.get() {
                Some(callback) => callback(id),
                None => warn!("Timer {} expired with no callback registered", id),
            }
        });
        tasks.insert(id, task);
        Ok(())
    }

    fn cancel_timer(&self, id: TimerId) {
        match lock(&self.tasks).remove(&id) {
            Some(task) => task.abort(),
            None => debug!("Timer {} is not armed", id),
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for TokioTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTimer")
            .field("pending", &self.pending())
            .finish()
    }
}
