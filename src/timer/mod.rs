//! Krypton - Timers
//!
//! Retries, keepalives and expirations are scheduled through a
//! [`TimerManager`], which keeps the pending callbacks and delegates arming
//! to a platform [`TimerInterface`](crate::core::TimerInterface).
//!
//! ```text
//! session ──start/cancel──▶ TimerManager ──start/cancel──▶ TimerInterface
//!    ▲                          │   ▲                             │
//!    └──────── callback ────────┘   └────────── expiry(id) ───────┘
//! ```

mod manager;
#[cfg(feature = "runtime")]
mod tokio_timer;

pub use manager::{TimerCallback, TimerManager};
#[cfg(feature = "runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "runtime")))]
pub use tokio_timer::TokioTimer;
