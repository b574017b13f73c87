//! Deterministic offline issue source.
//!
//! Serves a synthetic five-user, five-project dataset so the full
//! aggregation pipeline can run without Redmine credentials. All data
//! is derived from the query dates, so repeated calls over the same
//! period return identical results.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use redtrack_core::{DueIssueQuery, IssueSource, TimeEntryQuery};
use redtrack_domain::constants::{ISSUE_PAGE_SIZE, TIME_ENTRY_PAGE_SIZE};
use redtrack_domain::{Issue, IssueAssignee, Page, Project, Result, TimeEntry};

const USERS: &[(i64, &str)] = &[
    (1, "佐藤 太郎"),
    (2, "鈴木 花子"),
    (3, "田中 一郎"),
    (4, "高橋 美咲"),
    (5, "伊藤 健太"),
];

const PROJECTS: &[(i64, &str, &str)] = &[
    (1, "基幹システム刷新", "core-renewal"),
    (2, "モバイルアプリ開発", "mobile-app"),
    (3, "社内ポータル", "intranet-portal"),
    (4, "データ分析基盤", "analytics"),
    (5, "インフラ運用", "infra-ops"),
];

/// Offline [`IssueSource`] with a fixed synthetic dataset.
#[derive(Debug, Default)]
pub struct MockIssueSource;

impl MockIssueSource {
    /// Create the offline source.
    pub fn new() -> Self {
        Self
    }

    /// Three tickets per user: one completed, one in progress, one new.
    fn catalog() -> Vec<Issue> {
        USERS
            .iter()
            .flat_map(|&(user_id, user_name)| {
                let assignee = IssueAssignee { id: user_id, name: user_name.to_string() };
                [
                    Issue {
                        id: user_id * 100 + 1,
                        subject: format!("{user_name}の実装タスク"),
                        status_id: Some(5),
                        status_name: "完了".to_string(),
                        estimated_hours: Some(8.0),
                        assignee: Some(assignee.clone()),
                    },
                    Issue {
                        id: user_id * 100 + 2,
                        subject: format!("{user_name}のレビュータスク"),
                        status_id: Some(2),
                        status_name: "進行中".to_string(),
                        estimated_hours: Some(5.0),
                        assignee: Some(assignee.clone()),
                    },
                    Issue {
                        id: user_id * 100 + 3,
                        subject: format!("{user_name}の調査タスク"),
                        status_id: Some(1),
                        status_name: "新規".to_string(),
                        estimated_hours: Some(3.0),
                        assignee: Some(assignee),
                    },
                ]
            })
            .collect()
    }

    /// Entries for every weekday in the range: a morning meeting entry
    /// (matching the default exclusion list) plus work on two tickets.
    fn entries_for(query: &TimeEntryQuery) -> Vec<TimeEntry> {
        let mut entries = Vec::new();
        let mut day = query.start;
        while day <= query.end {
            let weekday = day.weekday();
            if weekday != Weekday::Sat && weekday != Weekday::Sun {
                for &(user_id, user_name) in USERS {
                    if query.user_id.is_some_and(|wanted| wanted != user_id) {
                        continue;
                    }
                    entries.extend(Self::day_entries(day, user_id, user_name));
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        entries
    }

    fn day_entries(day: NaiveDate, user_id: i64, user_name: &str) -> [TimeEntry; 3] {
        let day_seed = i64::from(day.num_days_from_ce());
        let base_id = day_seed * 100 + user_id * 10;
        let template = |slot: i64, issue_offset: i64, hours: f64, comments: &str| TimeEntry {
            id: base_id + slot,
            user_id,
            user_name: user_name.to_string(),
            issue_id: user_id * 100 + issue_offset,
            issue_subject: None,
            project_id: Some((user_id - 1) % (PROJECTS.len() as i64) + 1),
            hours,
            spent_on: day,
            comments: Some(comments.to_string()),
        };

        [
            template(1, 1, 0.5, "朝会"),
            template(2, 1, 4.0, "実装作業"),
            template(3, 2, 2.5, "レビュー対応"),
        ]
    }

    fn page_of<T: Clone>(items: &[T], offset: u64, page_size: usize) -> Page<T> {
        let from = usize::try_from(offset).unwrap_or(usize::MAX).min(items.len());
        let to = (from + page_size).min(items.len());
        Page { items: items[from..to].to_vec(), total_count: Some(items.len() as u64) }
    }
}

#[async_trait]
impl IssueSource for MockIssueSource {
    async fn time_entries_page(
        &self,
        query: &TimeEntryQuery,
        offset: u64,
    ) -> Result<Option<Page<TimeEntry>>> {
        let entries = Self::entries_for(query);
        Ok(Some(Self::page_of(&entries, offset, TIME_ENTRY_PAGE_SIZE)))
    }

    async fn due_issues_page(
        &self,
        _query: &DueIssueQuery,
        offset: u64,
    ) -> Result<Option<Page<Issue>>> {
        let issues = Self::catalog();
        Ok(Some(Self::page_of(&issues, offset, ISSUE_PAGE_SIZE)))
    }

    async fn issues_by_ids(&self, ids: &[i64]) -> Result<Option<Vec<Issue>>> {
        Ok(Some(Self::catalog().into_iter().filter(|issue| ids.contains(&issue.id)).collect()))
    }

    async fn projects(&self) -> Result<Option<Vec<Project>>> {
        Ok(Some(
            PROJECTS
                .iter()
                .map(|&(id, name, identifier)| Project {
                    id,
                    name: name.to_string(),
                    identifier: identifier.to_string(),
                    description: String::new(),
                })
                .collect(),
        ))
    }
}
