//! Background scheduling.

pub mod error;
pub mod fetch_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use fetch_scheduler::{FetchScheduler, FetchSchedulerConfig};
