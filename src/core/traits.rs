//! Core traits for the Krypton session core.
//!
//! These traits define the seams to platform collaborators.

use std::fmt;
use std::time::Duration;

use super::error::TimerError;

/// Opaque identifier of a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Create a timer id from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback invoked by a timer primitive when a timer expires.
pub type ExpiryCallback = Box<dyn Fn(TimerId) + Send + Sync + 'static>;

/// Platform timer primitive.
///
/// The primitive only knows about ids and durations; callbacks and labels
/// live in [`TimerManager`](crate::timer::TimerManager).
///
/// # Requirements
///
/// - `register_callback` is called exactly once, before any timer is started
/// - the expiry callback MUST NOT be invoked synchronously from inside
///   `start_timer`; it may be invoked from any other thread
/// - `cancel_timer` MUST tolerate ids that are unknown or already fired
///
/// # Example
///
/// ```ignore
/// struct NoopTimer;
///
/// impl TimerInterface for NoopTimer {
///     fn register_callback(&self, _callback: ExpiryCallback) {}
///
///     fn start_timer(&self, _id: TimerId, _duration: Duration) -> Result<(), TimerError> {
///         Ok(())
///     }
///
///     fn cancel_timer(&self, _id: TimerId) {}
/// }
/// ```
pub trait TimerInterface: Send + Sync {
    /// Register the single expiry callback.
    fn register_callback(&self, callback: ExpiryCallback);

    /// Arm a timer tagged with `id` that expires after `duration`.
    fn start_timer(&self, id: TimerId, duration: Duration) -> Result<(), TimerError>;

    /// Disarm a timer. Unknown ids are ignored.
    fn cancel_timer(&self, id: TimerId);
}
