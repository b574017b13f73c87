//! Port interfaces for the aggregation engine
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations. The external issue source is
//! async (network-bound); the cache-store ports are synchronous.

use async_trait::async_trait;
use chrono::NaiveDate;
use redtrack_domain::{
    Issue, Page, Project, Result, StatusDefinition, TimeEntry, UserSetting,
};

/// Query parameters for one time-entry page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Query parameters for one due-issue page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueIssueQuery {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub project_id: Option<i64>,
}

/// Trait for the external, read-only, paginated issue/time-entry source.
///
/// Every method returns `Ok(None)` when the source is unconfigured
/// (degraded no-op state) and `Err` when a call was attempted and
/// failed. Callers stop paging on either outcome and keep partial
/// results.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch one page of time entries at the given offset.
    async fn time_entries_page(
        &self,
        query: &TimeEntryQuery,
        offset: u64,
    ) -> Result<Option<Page<TimeEntry>>>;

    /// Fetch one page of issues due within the query month, restricted
    /// to issues with an assignee.
    async fn due_issues_page(
        &self,
        query: &DueIssueQuery,
        offset: u64,
    ) -> Result<Option<Page<Issue>>>;

    /// Batch-fetch issue details by id. Callers must keep batches at or
    /// below the batch-size limit.
    async fn issues_by_ids(&self, ids: &[i64]) -> Result<Option<Vec<Issue>>>;

    /// List available projects.
    async fn projects(&self) -> Result<Option<Vec<Project>>>;
}

/// Trait for the persisted time-entry cache.
pub trait TimeEntryRepository: Send + Sync {
    /// Insert an entry unless one with the same external id exists.
    /// Returns `true` when a row was inserted (first-write-wins).
    fn insert_if_absent(&self, entry: &TimeEntry) -> Result<bool>;

    /// Fetch cached entries whose `spent_on` falls in `[start, end]`,
    /// optionally restricted to one project.
    fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        project_id: Option<i64>,
    ) -> Result<Vec<TimeEntry>>;
}

/// Trait for the persisted user cache.
pub trait UserRepository: Send + Sync {
    /// Insert the user or refresh its display name when changed.
    fn upsert(&self, id: i64, name: &str) -> Result<()>;
}

/// Trait for the persisted status classification cache.
pub trait StatusRepository: Send + Sync {
    /// Look up a status definition by name.
    fn find_by_name(&self, name: &str) -> Result<Option<StatusDefinition>>;

    /// Insert a definition unless the name is already classified.
    /// Never overwrites an existing flag.
    fn insert_if_absent(&self, definition: &StatusDefinition) -> Result<()>;

    /// Deliberately reclassify an existing status name.
    fn set_completed(&self, name: &str, is_completed: bool) -> Result<()>;
}

/// Trait for per-user configuration lookups.
///
/// The engine resolves every user's settings up front, so the port
/// only exposes the bulk lookup.
pub trait UserSettingRepository: Send + Sync {
    /// All configured users.
    fn find_all(&self) -> Result<Vec<UserSetting>>;
}
