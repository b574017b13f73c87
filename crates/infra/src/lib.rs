//! # RedTrack Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite cache repositories (time entries, users, statuses, settings)
//! - The HTTP Redmine client and the deterministic offline source
//! - Configuration loading (environment variables and config files)
//! - The background fetch scheduler
//!
//! ## Architecture
//! - Implements traits defined in `redtrack-core`
//! - Depends on `redtrack-domain` and `redtrack-core`
//! - Contains all "impure" code (I/O, network, clock)

pub mod config;
pub mod database;
pub mod redmine;
pub mod scheduling;

// Re-export commonly used items
pub use database::{
    DbManager, SqliteStatusRepository, SqliteTimeEntryRepository, SqliteUserRepository,
    SqliteUserSettingRepository,
};
pub use redmine::{build_issue_source, HttpIssueSource, MockIssueSource};
pub use scheduling::{FetchScheduler, FetchSchedulerConfig, SchedulerError};
