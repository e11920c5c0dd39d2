//! Scheduling infrastructure for background refreshes
//!
//! Schedulers follow the same runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on every refresh

pub mod error;
pub mod update_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use update_scheduler::{UpdateScheduler, UpdateSchedulerConfig};
