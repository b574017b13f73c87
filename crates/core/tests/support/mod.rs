//! Shared test doubles and fixture builders for core integration tests.

pub mod repositories;
pub mod source;

use chrono::NaiveDate;
use redtrack_domain::{Issue, IssueAssignee, TimeEntry};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Time entry fixture with sensible defaults; June 2025, user "Tanaka".
pub fn entry(id: i64, user_id: i64, issue_id: i64, hours: f64) -> TimeEntry {
    TimeEntry {
        id,
        user_id,
        user_name: format!("User {user_id}"),
        issue_id,
        issue_subject: Some(format!("Ticket {issue_id}")),
        project_id: None,
        hours,
        spent_on: date(2025, 6, 10),
        comments: Some("implementation".to_string()),
    }
}

/// Issue fixture with an assignee and an open status.
pub fn issue(id: i64, status_name: &str, estimated_hours: Option<f64>) -> Issue {
    Issue {
        id,
        subject: format!("Ticket {id}"),
        status_id: None,
        status_name: status_name.to_string(),
        estimated_hours,
        assignee: None,
    }
}

pub fn assigned(mut issue: Issue, user_id: i64) -> Issue {
    issue.assignee = Some(IssueAssignee { id: user_id, name: format!("User {user_id}") });
    issue
}
