//! # RedTrack Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The aggregation engine ([`ProgressService`])
//! - Working-hours calendar, exclusion filter and status classifier
//! - Port/adapter interfaces (traits) for the cache store and the
//!   external issue source
//!
//! ## Architecture Principles
//! - Only depends on `redtrack-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod progress;

// Re-export specific items to avoid ambiguity
pub use progress::calendar::WorkingHoursCalendar;
pub use progress::classifier::StatusClassifier;
pub use progress::exclusion::{effective_keywords, exclusion_reason};
pub use progress::ports::{
    DueIssueQuery, IssueSource, StatusRepository, TimeEntryQuery, TimeEntryRepository,
    UserRepository, UserSettingRepository,
};
pub use progress::service::{FetchConfig, ProgressService};
