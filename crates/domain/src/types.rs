//! Domain data types for time entries, tickets and per-user statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A time entry logged against a ticket, cached locally.
///
/// `id` is the external (Redmine) identifier and is globally unique;
/// ingestion is first-write-wins, so an entry is never re-updated once
/// cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub issue_id: i64,
    pub issue_subject: Option<String>,
    pub project_id: Option<i64>,
    pub hours: f64,
    pub spent_on: NaiveDate,
    pub comments: Option<String>,
}

/// A user observed on a time entry, cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedmineUser {
    pub id: i64,
    pub name: String,
}

/// Persistent classification of a status name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub name: String,
    pub redmine_id: Option<i64>,
    pub is_completed: bool,
}

/// Per-user configuration consumed by the aggregation engine.
///
/// An empty `exclude_keywords` list means the default list applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSetting {
    pub user_id: i64,
    pub monthly_working_hours: Option<f64>,
    pub exclude_keywords: Vec<String>,
}

/// Assignee reference carried on an issue payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAssignee {
    pub id: i64,
    pub name: String,
}

/// Wire-level issue as returned by the external source. Transient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub subject: String,
    pub status_id: Option<i64>,
    pub status_name: String,
    pub estimated_hours: Option<f64>,
    pub assignee: Option<IssueAssignee>,
}

/// A classified ticket with resolved completion state. Transient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub subject: String,
    pub status_name: String,
    pub is_completed: bool,
    pub estimated_hours: f64,
}

/// A project available in the external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub description: String,
}

/// A ticket removed from working-hour totals by an exclusion keyword.
///
/// Deduplicated by issue id; `hours` accumulates across all excluded
/// entries for the same ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedTicket {
    pub id: i64,
    pub subject: String,
    pub hours: f64,
    pub reason: String,
}

/// Per-user productivity statistics for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: i64,
    pub user_name: String,
    /// Estimated hours of tickets counted as consumed.
    pub consumed_estimated_hours: f64,
    /// Hours actually logged in the period, after exclusions.
    pub working_hours: f64,
    /// Hours removed by exclusion keywords.
    pub excluded_hours: f64,
    pub excluded_tickets: Vec<ExcludedTicket>,
    /// Percentage of consumed estimated hours against the adjusted
    /// monthly baseline, rounded half-up, clamped to [0, 100].
    pub progress_rate: u32,
    pub total_tickets: usize,
    pub completed_tickets: usize,
    /// Completed tickets whose estimate held (or due-only tickets with
    /// any estimate).
    pub consumed_tickets: usize,
    /// Percentage of completed tickets over total tickets.
    pub ticket_completion_rate: u32,
    /// Estimated hours of completed entry-path tickets, uncapped.
    pub completed_estimated_hours: f64,
    /// Monthly working-hour baseline (calendar or per-user override).
    pub month_working_hours: f64,
}

/// Per-ticket breakdown row for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub id: i64,
    pub subject: String,
    pub status: String,
    pub estimated_hours: f64,
    pub spent_hours: f64,
    pub is_completed: bool,
    /// Completed within its estimate: `is_completed` and
    /// `estimated_hours > 0` and `spent_hours <= estimated_hours`.
    pub is_consumed: bool,
}

/// One page of results from the external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
}
