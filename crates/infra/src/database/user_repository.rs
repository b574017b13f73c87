//! SQLite-backed user cache.

use std::sync::Arc;

use redtrack_core::UserRepository;
use redtrack_domain::Result;
use rusqlite::params;

use super::manager::{map_sql_error, DbManager};

const UPSERT_QUERY: &str = "INSERT INTO redmine_users (id, name) VALUES (?1, ?2) \
    ON CONFLICT(id) DO UPDATE SET name = excluded.name";

/// SQLite implementation of the user cache port.
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

impl UserRepository for SqliteUserRepository {
    fn upsert(&self, id: i64, name: &str) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(UPSERT_QUERY, params![id, name]).map_err(map_sql_error)?;
        Ok(())
    }
}
