//! Error types for the Krypton session core.

use thiserror::Error;

use super::traits::TimerId;

/// Errors reported by a timer primitive.
///
/// These pass through [`TimerManager::start_timer`](crate::timer::TimerManager::start_timer)
/// unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The platform refused to arm the timer.
    #[error("timer start failed: {0}")]
    StartFailed(String),

    /// A timer with this id is already armed.
    #[error("timer {0} is already running")]
    AlreadyRunning(TimerId),

    /// No async runtime is available to drive the timer.
    #[error("no runtime available to drive timers")]
    NoRuntime,
}

/// Coarse classification of a [`KryptonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input shape.
    InvalidArgument,
    /// Operation attempted on an empty or unready state.
    FailedPrecondition,
    /// A bounded resource has been fully consumed.
    ResourceExhausted,
    /// Failure passed through from the timer primitive.
    Primitive,
    /// Invalid configuration.
    Config,
}

/// Top-level Krypton errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KryptonError {
    /// Malformed input (bad JSON, wrong value type, bad proto bytes,
    /// unrecognized enum string, missing or mixed body).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted on an empty plan or unready state.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// A bounded sequence has been fully consumed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Timer primitive failure.
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl KryptonError {
    /// Shorthand for [`KryptonError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            Self::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            Self::Timer(_) => ErrorKind::Primitive,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the session layer should stop retrying and report a
    /// connectivity failure.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}

/// Result alias used throughout the crate.
pub type KryptonResult<T> = Result<T, KryptonError>;
