//! Core traits, constants, configuration and error types.

mod config;
pub mod constants;
mod error;
mod traits;

pub use config::{DatapathProtocol, KryptonConfig, KryptonConfigBuilder};
pub use error::{ErrorKind, KryptonError, KryptonResult, TimerError};
pub use traits::{ExpiryCallback, TimerId, TimerInterface};
