//! # Krypton Core
//!
//! Session re-establishment core of the Krypton VPN client.
//!
//! When a tunnel drops, the session layer re-authenticates, picks a new
//! datapath address and schedules retries. This crate holds the pieces that
//! have to be right for that to work:
//!
//! - [`timer`]: a timer registry over a platform timer primitive, with
//!   cancel-wins semantics and callbacks run outside the lock
//! - [`datapath`]: ordered, retry-bounded selection of egress addresses
//! - [`auth`]: the auth-and-sign handshake codec (JSON or protobuf) with
//!   relay hostname allowlisting
//! - [`proto`]: the protobuf messages used by the handshake
//! - [`utils`]: protobuf time conversions and latency bookkeeping
//!
//! ## Feature Flags
//!
//! - `runtime` (default): [`TokioTimer`](timer::TokioTimer), a timer
//!   primitive backed by the tokio runtime
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use krypton_core::prelude::*;
//!
//! struct NoopTimer;
//!
//! impl TimerInterface for NoopTimer {
//!     fn register_callback(&self, _callback: ExpiryCallback) {}
//!     fn start_timer(&self, _id: TimerId, _duration: Duration) -> Result<(), TimerError> {
//!         Ok(())
//!     }
//!     fn cancel_timer(&self, _id: TimerId) {}
//! }
//!
//! let krypton = Krypton::new(KryptonConfig::default(), Arc::new(NoopTimer)).unwrap();
//! krypton
//!     .address_selector()
//!     .reset(&["1.1.1.1", "[2001:db8::1]:2153"], None);
//!
//! let endpoint = krypton.address_selector().select_datapath_address().unwrap();
//! assert_eq!(endpoint.host_port(), "1.1.1.1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

pub mod auth;
pub mod datapath;
pub mod proto;
pub mod timer;
pub mod utils;

mod context;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::auth::{
        ApnType, AuthAndSignRequest, AuthAndSignResponse, HttpRequest, HttpResponse,
        PublicKeyRequest, PublicKeyResponse,
    };
    pub use crate::context::Krypton;
    pub use crate::datapath::{DatapathAddressSelector, Endpoint, NetworkInfo};
    pub use crate::timer::TimerManager;

    #[cfg(feature = "runtime")]
    pub use crate::timer::TokioTimer;
}

// Re-export commonly used items at crate root
pub use context::Krypton;
pub use crate::core::{KryptonConfig, KryptonError, KryptonResult};
