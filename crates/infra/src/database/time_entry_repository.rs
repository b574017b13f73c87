//! SQLite-backed time-entry cache.
//!
//! Rows are keyed by the external entry id and inserted with
//! `INSERT OR IGNORE`, so re-fetching a period never duplicates or
//! rewrites cached entries. Dates are stored as ISO `YYYY-MM-DD` text,
//! which keeps range queries a plain lexicographic comparison.

use std::sync::Arc;

use chrono::NaiveDate;
use redtrack_core::TimeEntryRepository;
use redtrack_domain::{Result, TimeEntry};
use rusqlite::{params, Row};

use super::manager::{map_sql_error, DbManager};

const INSERT_QUERY: &str = "INSERT OR IGNORE INTO time_entries \
    (id, user_id, user_name, issue_id, issue_subject, project_id, hours, spent_on, comments) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const FIND_IN_RANGE_QUERY: &str = "SELECT id, user_id, user_name, issue_id, issue_subject, \
    project_id, hours, spent_on, comments FROM time_entries \
    WHERE spent_on >= ?1 AND spent_on <= ?2 ORDER BY id";

const FIND_IN_RANGE_BY_PROJECT_QUERY: &str = "SELECT id, user_id, user_name, issue_id, \
    issue_subject, project_id, hours, spent_on, comments FROM time_entries \
    WHERE spent_on >= ?1 AND spent_on <= ?2 AND project_id = ?3 ORDER BY id";

/// SQLite implementation of the time-entry cache port.
pub struct SqliteTimeEntryRepository {
    db: Arc<DbManager>,
}

impl SqliteTimeEntryRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

impl TimeEntryRepository for SqliteTimeEntryRepository {
    fn insert_if_absent(&self, entry: &TimeEntry) -> Result<bool> {
        let conn = self.db.get_connection()?;
        let inserted = conn
            .execute(
                INSERT_QUERY,
                params![
                    entry.id,
                    entry.user_id,
                    entry.user_name,
                    entry.issue_id,
                    entry.issue_subject,
                    entry.project_id,
                    entry.hours,
                    entry.spent_on.to_string(),
                    entry.comments,
                ],
            )
            .map_err(map_sql_error)?;
        Ok(inserted > 0)
    }

    fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        project_id: Option<i64>,
    ) -> Result<Vec<TimeEntry>> {
        let conn = self.db.get_connection()?;
        let start = start.to_string();
        let end = end.to_string();

        let entries = match project_id {
            Some(project_id) => {
                let mut stmt =
                    conn.prepare(FIND_IN_RANGE_BY_PROJECT_QUERY).map_err(map_sql_error)?;
                let rows = stmt
                    .query_map(params![start, end, project_id], map_row)
                    .map_err(map_sql_error)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?
            }
            None => {
                let mut stmt = conn.prepare(FIND_IN_RANGE_QUERY).map_err(map_sql_error)?;
                let rows = stmt.query_map(params![start, end], map_row).map_err(map_sql_error)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?
            }
        };

        Ok(entries)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<TimeEntry> {
    let spent_on: String = row.get("spent_on")?;
    let spent_on = spent_on.parse::<NaiveDate>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(TimeEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        issue_id: row.get("issue_id")?,
        issue_subject: row.get("issue_subject")?,
        project_id: row.get("project_id")?,
        hours: row.get("hours")?,
        spent_on,
        comments: row.get("comments")?,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn repository() -> (SqliteTimeEntryRepository, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db = Arc::new(
            DbManager::new(temp_dir.path().join("test.db"), 2).expect("manager created"),
        );
        db.run_migrations().expect("migrations run");
        (SqliteTimeEntryRepository::new(db), temp_dir)
    }

    fn entry(id: i64, spent_on: &str) -> TimeEntry {
        TimeEntry {
            id,
            user_id: 1,
            user_name: "Tanaka".to_string(),
            issue_id: 42,
            issue_subject: Some("Implement parser".to_string()),
            project_id: Some(7),
            hours: 3.5,
            spent_on: spent_on.parse().expect("valid date"),
            comments: Some("implementation".to_string()),
        }
    }

    #[test]
    fn insert_is_first_write_wins() {
        let (repo, _dir) = repository();

        assert!(repo.insert_if_absent(&entry(1, "2025-06-10")).expect("insert"));

        let mut changed = entry(1, "2025-06-10");
        changed.hours = 99.0;
        assert!(!repo.insert_if_absent(&changed).expect("second insert"));

        let rows = repo
            .find_in_range("2025-06-01".parse().expect("date"), "2025-06-30".parse().expect("date"), None)
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hours, 3.5);
    }

    #[test]
    fn range_query_is_inclusive_on_both_bounds() {
        let (repo, _dir) = repository();
        repo.insert_if_absent(&entry(1, "2025-06-01")).expect("insert");
        repo.insert_if_absent(&entry(2, "2025-06-30")).expect("insert");
        repo.insert_if_absent(&entry(3, "2025-07-01")).expect("insert");

        let rows = repo
            .find_in_range("2025-06-01".parse().expect("date"), "2025-06-30".parse().expect("date"), None)
            .expect("query");
        let ids: Vec<i64> = rows.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn project_filter_restricts_results() {
        let (repo, _dir) = repository();
        repo.insert_if_absent(&entry(1, "2025-06-10")).expect("insert");

        let mut other = entry(2, "2025-06-10");
        other.project_id = Some(8);
        repo.insert_if_absent(&other).expect("insert");

        let mut unknown = entry(3, "2025-06-10");
        unknown.project_id = None;
        repo.insert_if_absent(&unknown).expect("insert");

        let rows = repo
            .find_in_range(
                "2025-06-01".parse().expect("date"),
                "2025-06-30".parse().expect("date"),
                Some(7),
            )
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn optional_fields_round_trip() {
        let (repo, _dir) = repository();
        let mut bare = entry(1, "2025-06-10");
        bare.issue_subject = None;
        bare.project_id = None;
        bare.comments = None;
        repo.insert_if_absent(&bare).expect("insert");

        let rows = repo
            .find_in_range("2025-06-01".parse().expect("date"), "2025-06-30".parse().expect("date"), None)
            .expect("query");
        assert_eq!(rows[0], bare);
    }
}
