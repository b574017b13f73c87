//! SQLite-backed status classification cache.
//!
//! The `name` column is the primary key; classification is insert-only
//! through `insert_if_absent`, and `set_completed` exists for explicit
//! operator reclassification.

use std::sync::Arc;

use redtrack_core::StatusRepository;
use redtrack_domain::{Result, StatusDefinition};
use rusqlite::{params, OptionalExtension, Row};

use super::manager::{map_sql_error, DbManager};

const FIND_BY_NAME_QUERY: &str =
    "SELECT name, redmine_id, is_completed FROM status_definitions WHERE name = ?1";

const INSERT_QUERY: &str = "INSERT OR IGNORE INTO status_definitions \
    (name, redmine_id, is_completed) VALUES (?1, ?2, ?3)";

const SET_COMPLETED_QUERY: &str =
    "UPDATE status_definitions SET is_completed = ?2 WHERE name = ?1";

/// SQLite implementation of the status cache port.
pub struct SqliteStatusRepository {
    db: Arc<DbManager>,
}

impl SqliteStatusRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

impl StatusRepository for SqliteStatusRepository {
    fn find_by_name(&self, name: &str) -> Result<Option<StatusDefinition>> {
        let conn = self.db.get_connection()?;
        conn.query_row(FIND_BY_NAME_QUERY, params![name], map_row)
            .optional()
            .map_err(map_sql_error)
    }

    fn insert_if_absent(&self, definition: &StatusDefinition) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            INSERT_QUERY,
            params![definition.name, definition.redmine_id, definition.is_completed],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn set_completed(&self, name: &str, is_completed: bool) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(SET_COMPLETED_QUERY, params![name, is_completed]).map_err(map_sql_error)?;
        Ok(())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StatusDefinition> {
    Ok(StatusDefinition {
        name: row.get("name")?,
        redmine_id: row.get("redmine_id")?,
        is_completed: row.get("is_completed")?,
    })
}
