//! Aggregation engine - core business logic.
//!
//! Pulls time entries and due tickets (cache-first, then the paginated
//! external source), applies exclusion rules and status classification,
//! and derives per-user productivity statistics.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use redtrack_domain::constants::{ISSUE_BATCH_SIZE, ISSUE_PAGE_SIZE, TIME_ENTRY_PAGE_SIZE};
use redtrack_domain::{
    ExcludedTicket, FetchSettings, Issue, Project, RedTrackError, Result, Ticket, TicketDetail,
    TimeEntry, UserSetting, UserStats,
};
use tracing::{debug, info, warn};

use super::calendar::{month_bounds, WorkingHoursCalendar};
use super::classifier::StatusClassifier;
use super::exclusion::{effective_keywords, exclusion_reason};
use super::ports::{
    DueIssueQuery, IssueSource, TimeEntryQuery, TimeEntryRepository, UserRepository,
    UserSettingRepository,
};

/// Tuning for source fetches.
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    /// Optional fixed delay between consecutive source calls. Used by
    /// scheduled bulk fetches to respect rate limits.
    pub page_delay: Option<Duration>,
}

impl FetchConfig {
    /// Derive fetch pacing from the loaded settings. A zero delay
    /// disables pacing entirely.
    pub fn from_settings(settings: &FetchSettings) -> Self {
        let page_delay = match settings.page_delay_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self { page_delay }
    }
}

/// Result of paging through one sub-fetch of the external source.
///
/// `complete` is false when paging stopped early: a page failed or the
/// source is unconfigured. Items accumulated before the stop are kept.
struct PagedFetch<T> {
    items: Vec<T>,
    complete: bool,
}

/// Per-user accumulator built while folding time entries and due
/// tickets. Output order follows first appearance.
struct UserFold {
    user_id: i64,
    user_name: String,
    working_hours: f64,
    excluded_hours: f64,
    excluded_tickets: Vec<ExcludedTicket>,
    spent_by_issue: HashMap<i64, f64>,
    due_issues: Vec<i64>,
}

impl UserFold {
    fn new(user_id: i64, user_name: &str) -> Self {
        Self {
            user_id,
            user_name: user_name.to_string(),
            working_hours: 0.0,
            excluded_hours: 0.0,
            excluded_tickets: Vec::new(),
            spent_by_issue: HashMap::new(),
            due_issues: Vec::new(),
        }
    }
}

/// The aggregation engine.
pub struct ProgressService {
    source: Arc<dyn IssueSource>,
    time_entries: Arc<dyn TimeEntryRepository>,
    users: Arc<dyn UserRepository>,
    settings: Arc<dyn UserSettingRepository>,
    classifier: StatusClassifier,
    calendar: WorkingHoursCalendar,
    fetch: FetchConfig,
}

impl ProgressService {
    /// Create a new aggregation engine over the given ports.
    ///
    /// Seeds the status cache with the canonical completed names so
    /// classification works before the first fetch.
    pub fn new(
        source: Arc<dyn IssueSource>,
        time_entries: Arc<dyn TimeEntryRepository>,
        users: Arc<dyn UserRepository>,
        settings: Arc<dyn UserSettingRepository>,
        classifier: StatusClassifier,
        calendar: WorkingHoursCalendar,
    ) -> Self {
        classifier.seed_defaults();
        Self {
            source,
            time_entries,
            users,
            settings,
            classifier,
            calendar,
            fetch: FetchConfig::default(),
        }
    }

    /// Configure fetch pacing (inter-call delay).
    pub fn with_fetch_config(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Per-user productivity statistics for `[start, end]`.
    ///
    /// Output order is the insertion order of first appearance; callers
    /// that need a sorted list must sort explicitly.
    pub async fn individual_progress_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        project_id: Option<i64>,
    ) -> Result<Vec<UserStats>> {
        validate_range(start, end)?;

        let query = TimeEntryQuery { start, end, project_id, user_id: None };
        let entries = self.collect_time_entries(&query).await?;

        let (month_start, month_end) = month_bounds(start);
        let due_query = DueIssueQuery { month_start, month_end, project_id };
        let due = self.page_due_issues(&due_query).await;
        if !due.complete {
            warn!("due-ticket fetch incomplete; statistics use partial due-ticket data");
        }

        let settings = self.settings_by_user()?;

        let mut folds: Vec<UserFold> = Vec::new();
        let mut fold_index: HashMap<i64, usize> = HashMap::new();
        let mut issue_ids: BTreeSet<i64> = BTreeSet::new();

        for entry in &entries {
            let keywords = effective_keywords(settings.get(&entry.user_id));
            let fold = fold_for(&mut folds, &mut fold_index, entry.user_id, &entry.user_name);

            if let Some(reason) = exclusion_reason(
                entry.comments.as_deref(),
                entry.issue_subject.as_deref(),
                &keywords,
            ) {
                info!(
                    issue_id = entry.issue_id,
                    keyword = reason,
                    hours = entry.hours,
                    "excluding time entry"
                );
                fold.excluded_hours += entry.hours;
                record_excluded_ticket(fold, entry, reason);
                continue;
            }

            fold.working_hours += entry.hours;
            *fold.spent_by_issue.entry(entry.issue_id).or_insert(0.0) += entry.hours;
            issue_ids.insert(entry.issue_id);
        }

        for issue in &due.items {
            let Some(assignee) = &issue.assignee else { continue };
            let fold = fold_for(&mut folds, &mut fold_index, assignee.id, &assignee.name);
            if !fold.due_issues.contains(&issue.id) {
                fold.due_issues.push(issue.id);
            }
            issue_ids.insert(issue.id);
        }

        let ids: Vec<i64> = issue_ids.into_iter().collect();
        let details = self.fetch_issue_details(&ids).await;

        let stats =
            folds.iter().map(|fold| self.user_stats(fold, &details, &settings, start)).collect();
        Ok(stats)
    }

    /// Flat per-ticket breakdown for one user in `[start, end]`.
    ///
    /// No exclusion filtering; sorted by ticket id ascending. An empty
    /// result means no entries in range, not an error.
    pub async fn user_ticket_details(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        project_id: Option<i64>,
    ) -> Result<Vec<TicketDetail>> {
        if user_id <= 0 {
            return Err(RedTrackError::InvalidInput("user id is required".into()));
        }
        validate_range(start, end)?;

        let query = TimeEntryQuery { start, end, project_id, user_id: Some(user_id) };
        let entries = self.collect_time_entries(&query).await?;

        // The cache path returns entries for every user in range.
        let mut spent_by_issue: HashMap<i64, f64> = HashMap::new();
        for entry in entries.iter().filter(|entry| entry.user_id == user_id) {
            *spent_by_issue.entry(entry.issue_id).or_insert(0.0) += entry.hours;
        }

        if spent_by_issue.is_empty() {
            warn!(user_id, "no time entries for user in range");
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = {
            let set: BTreeSet<i64> = spent_by_issue.keys().copied().collect();
            set.into_iter().collect()
        };
        let details = self.fetch_issue_details(&ids).await;

        let mut result: Vec<TicketDetail> = details
            .values()
            .map(|ticket| {
                let spent_hours = spent_by_issue.get(&ticket.id).copied().unwrap_or(0.0);
                let is_consumed = ticket.is_completed
                    && ticket.estimated_hours > 0.0
                    && spent_hours <= ticket.estimated_hours;
                TicketDetail {
                    id: ticket.id,
                    subject: ticket.subject.clone(),
                    status: ticket.status_name.clone(),
                    estimated_hours: ticket.estimated_hours,
                    spent_hours,
                    is_completed: ticket.is_completed,
                    is_consumed,
                }
            })
            .collect();
        result.sort_by_key(|detail| detail.id);

        info!(user_id, tickets = result.len(), "resolved user ticket details");
        Ok(result)
    }

    /// Projects available in the external source. An unconfigured
    /// source yields an empty list after a warning.
    pub async fn projects(&self) -> Result<Vec<Project>> {
        match self.source.projects().await? {
            Some(projects) => Ok(projects),
            None => {
                warn!("project source is not configured; returning no projects");
                Ok(Vec::new())
            }
        }
    }

    /// Fetch time entries, cache-first.
    ///
    /// When the cache holds rows in range they are the source of truth.
    /// Otherwise the external source is paged and every fetched entry
    /// (and its user) is persisted idempotently. `SourceUnavailable` is
    /// returned only when there is no cached fallback and the source
    /// produced nothing.
    async fn collect_time_entries(&self, query: &TimeEntryQuery) -> Result<Vec<TimeEntry>> {
        let cached = self.time_entries.find_in_range(query.start, query.end, query.project_id)?;
        if !cached.is_empty() {
            info!(
                count = cached.len(),
                start = %query.start,
                end = %query.end,
                "using cached time entries"
            );
            return Ok(cached);
        }

        info!(start = %query.start, end = %query.end, "no cached time entries; fetching from source");
        let fetched = self.page_time_entries(query).await;

        if fetched.items.is_empty() {
            if fetched.complete {
                warn!("no time entries found in the requested range");
                return Ok(Vec::new());
            }
            return Err(RedTrackError::SourceUnavailable(
                "no cached time entries and the external source returned no data".into(),
            ));
        }

        for entry in &fetched.items {
            self.persist_entry(entry);
        }

        info!(count = fetched.items.len(), "fetched time entries from source");
        Ok(fetched.items)
    }

    /// Persist one fetched entry and its user. Failures are logged and
    /// skipped; a bad record never aborts the aggregation.
    fn persist_entry(&self, entry: &TimeEntry) {
        match self.time_entries.insert_if_absent(entry) {
            Ok(inserted) => {
                if inserted {
                    debug!(entry_id = entry.id, "cached time entry");
                }
            }
            Err(err) => {
                warn!(entry_id = entry.id, error = %err, "failed to cache time entry");
            }
        }

        if let Err(err) = self.users.upsert(entry.user_id, &entry.user_name) {
            warn!(user_id = entry.user_id, error = %err, "failed to cache user");
        }
    }

    async fn page_time_entries(&self, query: &TimeEntryQuery) -> PagedFetch<TimeEntry> {
        let mut items: Vec<TimeEntry> = Vec::new();
        let mut offset = 0u64;

        loop {
            if offset > 0 {
                self.page_pause().await;
            }

            let page = match self.source.time_entries_page(query, offset).await {
                Ok(Some(page)) => page,
                Ok(None) => {
                    warn!("time-entry source is not configured");
                    return PagedFetch { items, complete: false };
                }
                Err(err) => {
                    warn!(offset, error = %err, "time-entry page fetch failed; keeping partial results");
                    return PagedFetch { items, complete: false };
                }
            };

            let fetched = page.items.len();
            items.extend(page.items);
            debug!(
                fetched,
                offset,
                total = items.len(),
                total_available = ?page.total_count,
                "fetched time-entry page"
            );

            // Continue only while a full page came back.
            if fetched < TIME_ENTRY_PAGE_SIZE {
                break;
            }
            offset += TIME_ENTRY_PAGE_SIZE as u64;
        }

        PagedFetch { items, complete: true }
    }

    async fn page_due_issues(&self, query: &DueIssueQuery) -> PagedFetch<Issue> {
        let mut items: Vec<Issue> = Vec::new();
        let mut offset = 0u64;

        loop {
            if offset > 0 {
                self.page_pause().await;
            }

            let page = match self.source.due_issues_page(query, offset).await {
                Ok(Some(page)) => page,
                Ok(None) => {
                    warn!("due-ticket source is not configured");
                    return PagedFetch { items, complete: false };
                }
                Err(err) => {
                    warn!(offset, error = %err, "due-ticket page fetch failed; keeping partial results");
                    return PagedFetch { items, complete: false };
                }
            };

            let fetched = page.items.len();
            items.extend(page.items);
            debug!(
                fetched,
                offset,
                total = items.len(),
                total_available = ?page.total_count,
                "fetched due-ticket page"
            );

            if fetched < ISSUE_PAGE_SIZE {
                break;
            }
            offset += ISSUE_PAGE_SIZE as u64;
        }

        PagedFetch { items, complete: true }
    }

    /// Batch-fetch issue details and classify each status. A failed
    /// batch halts the sequence; details already fetched are kept.
    async fn fetch_issue_details(&self, issue_ids: &[i64]) -> HashMap<i64, Ticket> {
        let mut details: HashMap<i64, Ticket> = HashMap::new();

        for (index, batch) in issue_ids.chunks(ISSUE_BATCH_SIZE).enumerate() {
            if index > 0 {
                self.page_pause().await;
            }

            let issues = match self.source.issues_by_ids(batch).await {
                Ok(Some(issues)) => issues,
                Ok(None) => {
                    warn!("issue source is not configured; skipping detail lookup");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "issue detail batch failed; continuing with partial details");
                    break;
                }
            };

            for issue in issues {
                let is_completed = self.classifier.classify(issue.status_id, &issue.status_name);
                debug!(
                    issue_id = issue.id,
                    status = %issue.status_name,
                    is_completed,
                    "classified issue status"
                );
                details.insert(
                    issue.id,
                    Ticket {
                        id: issue.id,
                        subject: issue.subject,
                        status_name: issue.status_name,
                        is_completed,
                        estimated_hours: issue.estimated_hours.unwrap_or(0.0),
                    },
                );
            }
        }

        details
    }

    /// Derive the statistics row for one folded user.
    fn user_stats(
        &self,
        fold: &UserFold,
        details: &HashMap<i64, Ticket>,
        settings: &HashMap<i64, UserSetting>,
        period_start: NaiveDate,
    ) -> UserStats {
        let mut base_tickets: BTreeSet<i64> = BTreeSet::new();
        let mut completed_tickets = 0usize;
        let mut consumed_tickets = 0usize;
        let mut consumed_estimated_hours = 0.0;
        let mut completed_estimated_hours = 0.0;

        // Entry path: the spent <= estimated cap applies.
        for (issue_id, spent) in &fold.spent_by_issue {
            let Some(ticket) = details.get(issue_id) else { continue };
            base_tickets.insert(*issue_id);

            if ticket.is_completed {
                completed_tickets += 1;
                if ticket.estimated_hours > 0.0 {
                    completed_estimated_hours += ticket.estimated_hours;
                    if *spent <= ticket.estimated_hours {
                        consumed_tickets += 1;
                        consumed_estimated_hours += ticket.estimated_hours;
                    }
                }
            }
        }

        // Due-ticket path: no time-entry evidence, so no cap applies.
        for issue_id in &fold.due_issues {
            if base_tickets.contains(issue_id) {
                continue;
            }
            let Some(ticket) = details.get(issue_id) else { continue };
            base_tickets.insert(*issue_id);

            if ticket.is_completed {
                completed_tickets += 1;
                if ticket.estimated_hours > 0.0 {
                    consumed_tickets += 1;
                    consumed_estimated_hours += ticket.estimated_hours;
                }
            }
        }

        let total_tickets = base_tickets.len();
        let month_working_hours =
            self.month_working_hours(period_start, settings.get(&fold.user_id));
        let adjusted_working_hours = month_working_hours - fold.excluded_hours;

        let progress_rate = if adjusted_working_hours > 0.0 {
            percentage(consumed_estimated_hours / adjusted_working_hours)
        } else {
            0
        };
        let ticket_completion_rate = if total_tickets > 0 {
            percentage(to_f64(completed_tickets) / to_f64(total_tickets))
        } else {
            0
        };

        UserStats {
            user_id: fold.user_id,
            user_name: fold.user_name.clone(),
            consumed_estimated_hours,
            working_hours: fold.working_hours,
            excluded_hours: fold.excluded_hours,
            excluded_tickets: fold.excluded_tickets.clone(),
            progress_rate,
            total_tickets,
            completed_tickets,
            consumed_tickets,
            ticket_completion_rate,
            completed_estimated_hours,
            month_working_hours,
        }
    }

    /// Monthly baseline: explicit per-user override wins over the
    /// calendar calculation.
    fn month_working_hours(&self, period_start: NaiveDate, setting: Option<&UserSetting>) -> f64 {
        if let Some(setting) = setting {
            if let Some(hours) = setting.monthly_working_hours {
                return hours;
            }
        }
        self.calendar.month_working_hours(period_start)
    }

    fn settings_by_user(&self) -> Result<HashMap<i64, UserSetting>> {
        let settings = self.settings.find_all()?;
        Ok(settings.into_iter().map(|setting| (setting.user_id, setting)).collect())
    }

    async fn page_pause(&self) {
        if let Some(delay) = self.fetch.page_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn fold_for<'a>(
    folds: &'a mut Vec<UserFold>,
    index: &mut HashMap<i64, usize>,
    user_id: i64,
    user_name: &str,
) -> &'a mut UserFold {
    let position = *index.entry(user_id).or_insert_with(|| {
        folds.push(UserFold::new(user_id, user_name));
        folds.len() - 1
    });
    &mut folds[position]
}

fn record_excluded_ticket(fold: &mut UserFold, entry: &TimeEntry, reason: &str) {
    if let Some(existing) =
        fold.excluded_tickets.iter_mut().find(|ticket| ticket.id == entry.issue_id)
    {
        existing.hours += entry.hours;
        return;
    }
    fold.excluded_tickets.push(ExcludedTicket {
        id: entry.issue_id,
        subject: entry.issue_subject.clone().unwrap_or_default(),
        hours: entry.hours,
        reason: reason.to_string(),
    });
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(RedTrackError::InvalidInput(
            "start date must not be after end date".into(),
        ));
    }
    Ok(())
}

/// Ratio to a half-up integer percentage, clamped to [0, 100].
fn percentage(ratio: f64) -> u32 {
    let rounded = (ratio * 100.0).round();
    if rounded <= 0.0 {
        0
    } else if rounded >= 100.0 {
        100
    } else {
        rounded as u32
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}
