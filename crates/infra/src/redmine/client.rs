//! HTTP client for the Redmine REST API.
//!
//! Missing credentials put the client into a degraded no-op state in
//! which every call returns `Ok(None)`; a configured client that fails
//! a request returns `Err` instead. The aggregation engine relies on
//! that distinction to keep partial results.

use std::time::Duration;

use async_trait::async_trait;
use redtrack_core::{DueIssueQuery, IssueSource, TimeEntryQuery};
use redtrack_domain::constants::{ISSUE_PAGE_SIZE, TIME_ENTRY_PAGE_SIZE};
use redtrack_domain::{
    Issue, IssueAssignee, Page, Project, RedTrackError, Result, TimeEntry,
};
use serde::Deserialize;
use tracing::{debug, error, warn};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
struct Credentials {
    base_url: String,
    api_key: String,
}

/// Redmine REST API client implementing the [`IssueSource`] port.
pub struct HttpIssueSource {
    credentials: Option<Credentials>,
    client: reqwest::Client,
}

impl HttpIssueSource {
    /// Create a client. Either credential part missing leaves the
    /// client unconfigured rather than failing construction.
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| RedTrackError::Network(format!("failed to build HTTP client: {e}")))?;

        let credentials = match (base_url, api_key) {
            (Some(base_url), Some(api_key)) if !base_url.is_empty() && !api_key.is_empty() => {
                Some(Credentials { base_url: base_url.trim_end_matches('/').to_string(), api_key })
            }
            _ => {
                warn!("redmine credentials not configured; external source disabled");
                None
            }
        };

        Ok(Self { credentials, client })
    }

    /// Whether credentials are configured.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", credentials.base_url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &credentials.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| RedTrackError::Network(format!("request to {endpoint} failed: {e}")))?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "received redmine response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            error!(endpoint, status = status.as_u16(), "redmine API error");
            return Err(RedTrackError::Network(format!(
                "redmine API error (HTTP {status}): {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RedTrackError::Network(format!("invalid response from {endpoint}: {e}")))
    }
}

#[async_trait]
impl IssueSource for HttpIssueSource {
    async fn time_entries_page(
        &self,
        query: &TimeEntryQuery,
        offset: u64,
    ) -> Result<Option<Page<TimeEntry>>> {
        let Some(credentials) = &self.credentials else { return Ok(None) };

        let mut params = vec![
            ("spent_on", format!("><{}|{}", query.start, query.end)),
            ("limit", TIME_ENTRY_PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(user_id) = query.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        if let Some(project_id) = query.project_id {
            params.push(("project_id", project_id.to_string()));
        }

        let response: TimeEntriesResponse =
            self.get_json(credentials, "time_entries.json", &params).await?;

        let items = response
            .time_entries
            .into_iter()
            .filter_map(|dto| match dto.into_entry() {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping malformed time entry");
                    None
                }
            })
            .collect();

        Ok(Some(Page { items, total_count: response.total_count }))
    }

    async fn due_issues_page(
        &self,
        query: &DueIssueQuery,
        offset: u64,
    ) -> Result<Option<Page<Issue>>> {
        let Some(credentials) = &self.credentials else { return Ok(None) };

        let mut params = vec![
            ("due_date", format!("><{}|{}", query.month_start, query.month_end)),
            ("assigned_to_id", "*".to_string()),
            ("status_id", "*".to_string()),
            ("limit", ISSUE_PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(project_id) = query.project_id {
            params.push(("project_id", project_id.to_string()));
        }

        let response: IssuesResponse = self.get_json(credentials, "issues.json", &params).await?;

        let items = response.issues.into_iter().map(IssueDto::into_issue).collect();
        Ok(Some(Page { items, total_count: response.total_count }))
    }

    async fn issues_by_ids(&self, ids: &[i64]) -> Result<Option<Vec<Issue>>> {
        let Some(credentials) = &self.credentials else { return Ok(None) };
        if ids.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let id_list =
            ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        let params = vec![
            ("issue_id", id_list),
            ("status_id", "*".to_string()),
            ("include", "relations".to_string()),
            ("limit", ids.len().to_string()),
        ];

        let response: IssuesResponse = self.get_json(credentials, "issues.json", &params).await?;
        Ok(Some(response.issues.into_iter().map(IssueDto::into_issue).collect()))
    }

    async fn projects(&self) -> Result<Option<Vec<Project>>> {
        let Some(credentials) = &self.credentials else { return Ok(None) };

        let params = vec![("limit", "100".to_string())];
        let response: ProjectsResponse =
            self.get_json(credentials, "projects.json", &params).await?;

        Ok(Some(response.projects.into_iter().map(ProjectDto::into_project).collect()))
    }
}

// Wire DTOs for the Redmine JSON payloads.

#[derive(Debug, Deserialize)]
struct NamedRef {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TimeEntriesResponse {
    time_entries: Vec<TimeEntryDto>,
    #[serde(default)]
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TimeEntryDto {
    id: i64,
    user: NamedRef,
    issue: Option<IssueRef>,
    project: Option<NamedRef>,
    hours: f64,
    spent_on: String,
    #[serde(default)]
    comments: Option<String>,
}

impl TimeEntryDto {
    fn into_entry(self) -> Result<TimeEntry> {
        let issue = self
            .issue
            .ok_or_else(|| RedTrackError::InvalidInput("time entry has no issue".into()))?;
        let spent_on = self
            .spent_on
            .parse()
            .map_err(|e| RedTrackError::InvalidInput(format!("bad spent_on date: {e}")))?;

        Ok(TimeEntry {
            id: self.id,
            user_id: self.user.id,
            user_name: self.user.name,
            issue_id: issue.id,
            issue_subject: None,
            project_id: self.project.map(|p| p.id),
            hours: self.hours,
            spent_on,
            comments: self.comments.filter(|c| !c.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StatusRef {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssuesResponse {
    issues: Vec<IssueDto>,
    #[serde(default)]
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct IssueDto {
    id: i64,
    #[serde(default)]
    subject: String,
    status: Option<StatusRef>,
    #[serde(default)]
    estimated_hours: Option<f64>,
    assigned_to: Option<NamedRef>,
}

impl IssueDto {
    fn into_issue(self) -> Issue {
        Issue {
            id: self.id,
            subject: self.subject,
            status_id: self.status.as_ref().map(|s| s.id),
            status_name: self.status.map(|s| s.name).unwrap_or_default(),
            estimated_hours: self.estimated_hours,
            assignee: self.assigned_to.map(|a| IssueAssignee { id: a.id, name: a.name }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Vec<ProjectDto>,
}

#[derive(Debug, Deserialize)]
struct ProjectDto {
    id: i64,
    name: String,
    identifier: String,
    #[serde(default)]
    description: String,
}

impl ProjectDto {
    fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            identifier: self.identifier,
            description: self.description,
        }
    }
}
