//! Scripted external-source double with per-endpoint failure injection.

use std::sync::Mutex;

use async_trait::async_trait;
use redtrack_core::{DueIssueQuery, IssueSource, TimeEntryQuery};
use redtrack_domain::constants::{ISSUE_PAGE_SIZE, TIME_ENTRY_PAGE_SIZE};
use redtrack_domain::{Issue, Page, Project, RedTrackError, Result, TimeEntry};

#[derive(Debug, Default, Clone, Copy)]
pub struct CallCounts {
    pub time_entry_pages: u32,
    pub due_issue_pages: u32,
    pub detail_batches: u32,
    pub project_lists: u32,
}

/// Source double serving fixed datasets page by page.
#[derive(Default)]
pub struct ScriptedSource {
    pub time_entries: Vec<TimeEntry>,
    pub due_issues: Vec<Issue>,
    pub issues: Vec<Issue>,
    pub projects: Vec<Project>,
    /// Pretend no credentials are configured: every call is `Ok(None)`.
    pub unconfigured: bool,
    /// Fail time-entry pages starting at this zero-based page index.
    pub fail_time_entry_pages_from: Option<u32>,
    /// Fail every due-issue page.
    pub fail_due_issues: bool,
    /// Fail every detail batch.
    pub fail_details: bool,
    calls: Mutex<CallCounts>,
}

impl ScriptedSource {
    pub fn with_time_entries(mut self, entries: Vec<TimeEntry>) -> Self {
        self.time_entries = entries;
        self
    }

    pub fn with_due_issues(mut self, issues: Vec<Issue>) -> Self {
        self.due_issues = issues;
        self
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    pub fn without_credentials(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    pub fn failing_time_entries_from(mut self, page: u32) -> Self {
        self.fail_time_entry_pages_from = Some(page);
        self
    }

    pub fn failing_due_issues(mut self) -> Self {
        self.fail_due_issues = true;
        self
    }

    pub fn failing_details(mut self) -> Self {
        self.fail_details = true;
        self
    }

    pub fn calls(&self) -> CallCounts {
        *self.calls.lock().expect("lock")
    }

    fn page_of<T: Clone>(items: &[T], offset: u64, page_size: usize) -> Page<T> {
        let from = usize::try_from(offset).expect("offset fits usize").min(items.len());
        let to = (from + page_size).min(items.len());
        Page {
            items: items[from..to].to_vec(),
            total_count: Some(items.len() as u64),
        }
    }
}

#[async_trait]
impl IssueSource for ScriptedSource {
    async fn time_entries_page(
        &self,
        query: &TimeEntryQuery,
        offset: u64,
    ) -> Result<Option<Page<TimeEntry>>> {
        let page_index = {
            let mut calls = self.calls.lock().expect("lock");
            calls.time_entry_pages += 1;
            calls.time_entry_pages - 1
        };

        if self.unconfigured {
            return Ok(None);
        }
        if self.fail_time_entry_pages_from.is_some_and(|from| page_index >= from) {
            return Err(RedTrackError::Network("time entries endpoint failed".into()));
        }

        let filtered: Vec<TimeEntry> = self
            .time_entries
            .iter()
            .filter(|entry| entry.spent_on >= query.start && entry.spent_on <= query.end)
            .filter(|entry| query.user_id.is_none() || Some(entry.user_id) == query.user_id)
            .filter(|entry| query.project_id.is_none() || entry.project_id == query.project_id)
            .cloned()
            .collect();
        Ok(Some(Self::page_of(&filtered, offset, TIME_ENTRY_PAGE_SIZE)))
    }

    async fn due_issues_page(
        &self,
        _query: &DueIssueQuery,
        offset: u64,
    ) -> Result<Option<Page<Issue>>> {
        self.calls.lock().expect("lock").due_issue_pages += 1;

        if self.unconfigured {
            return Ok(None);
        }
        if self.fail_due_issues {
            return Err(RedTrackError::Network("issues endpoint failed".into()));
        }
        Ok(Some(Self::page_of(&self.due_issues, offset, ISSUE_PAGE_SIZE)))
    }

    async fn issues_by_ids(&self, ids: &[i64]) -> Result<Option<Vec<Issue>>> {
        self.calls.lock().expect("lock").detail_batches += 1;

        if self.unconfigured {
            return Ok(None);
        }
        if self.fail_details {
            return Err(RedTrackError::Network("issue detail endpoint failed".into()));
        }
        Ok(Some(
            self.issues.iter().filter(|issue| ids.contains(&issue.id)).cloned().collect(),
        ))
    }

    async fn projects(&self) -> Result<Option<Vec<Project>>> {
        self.calls.lock().expect("lock").project_lists += 1;

        if self.unconfigured {
            return Ok(None);
        }
        Ok(Some(self.projects.clone()))
    }
}
