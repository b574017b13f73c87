//! SQLite-backed per-user settings.
//!
//! `exclude_keywords` is stored as a comma separated string; an empty
//! string maps to an empty list, which means the default keyword list
//! applies at aggregation time.

use std::sync::Arc;

use redtrack_core::UserSettingRepository;
use redtrack_domain::{Result, UserSetting};
use rusqlite::{params, OptionalExtension, Row};

use super::manager::{map_sql_error, DbManager};

const FIND_ALL_QUERY: &str =
    "SELECT user_id, monthly_working_hours, exclude_keywords FROM user_settings ORDER BY user_id";

const FIND_BY_USER_QUERY: &str =
    "SELECT user_id, monthly_working_hours, exclude_keywords FROM user_settings WHERE user_id = ?1";

const UPSERT_QUERY: &str = "INSERT INTO user_settings \
    (user_id, monthly_working_hours, exclude_keywords) VALUES (?1, ?2, ?3) \
    ON CONFLICT(user_id) DO UPDATE SET \
    monthly_working_hours = excluded.monthly_working_hours, \
    exclude_keywords = excluded.exclude_keywords";

/// SQLite implementation of the user-settings port.
pub struct SqliteUserSettingRepository {
    db: Arc<DbManager>,
}

impl SqliteUserSettingRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace the settings row for a user.
    pub fn upsert(&self, setting: &UserSetting) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            UPSERT_QUERY,
            params![
                setting.user_id,
                setting.monthly_working_hours,
                setting.exclude_keywords.join(","),
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    /// Settings row for one user, if present. Paired with [`Self::upsert`]
    /// for the settings-editing surface; the aggregation engine reads
    /// through the port's bulk lookup instead.
    pub fn find_by_user(&self, user_id: i64) -> Result<Option<UserSetting>> {
        let conn = self.db.get_connection()?;
        conn.query_row(FIND_BY_USER_QUERY, params![user_id], map_row)
            .optional()
            .map_err(map_sql_error)
    }
}

impl UserSettingRepository for SqliteUserSettingRepository {
    fn find_all(&self) -> Result<Vec<UserSetting>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn.prepare(FIND_ALL_QUERY).map_err(map_sql_error)?;
        let rows = stmt.query_map([], map_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<UserSetting> {
    let keywords: String = row.get("exclude_keywords")?;
    let exclude_keywords = keywords
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(ToString::to_string)
        .collect();

    Ok(UserSetting {
        user_id: row.get("user_id")?,
        monthly_working_hours: row.get("monthly_working_hours")?,
        exclude_keywords,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn repository() -> (SqliteUserSettingRepository, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db = Arc::new(
            DbManager::new(temp_dir.path().join("test.db"), 2).expect("manager created"),
        );
        db.run_migrations().expect("migrations run");
        (SqliteUserSettingRepository::new(db), temp_dir)
    }

    #[test]
    fn settings_round_trip() {
        let (repo, _dir) = repository();
        let setting = UserSetting {
            user_id: 1,
            monthly_working_hours: Some(140.0),
            exclude_keywords: vec!["standup".to_string(), "有給".to_string()],
        };
        repo.upsert(&setting).expect("upsert");

        let found = repo.find_by_user(1).expect("lookup").expect("row");
        assert_eq!(found, setting);
    }

    #[test]
    fn empty_keyword_column_maps_to_an_empty_list() {
        let (repo, _dir) = repository();
        let setting =
            UserSetting { user_id: 2, monthly_working_hours: None, exclude_keywords: Vec::new() };
        repo.upsert(&setting).expect("upsert");

        let found = repo.find_by_user(2).expect("lookup").expect("row");
        assert!(found.exclude_keywords.is_empty());
        assert_eq!(found.monthly_working_hours, None);
    }

    #[test]
    fn find_all_lists_every_configured_user() {
        let (repo, _dir) = repository();
        for user_id in [3, 1, 2] {
            repo.upsert(&UserSetting {
                user_id,
                monthly_working_hours: None,
                exclude_keywords: Vec::new(),
            })
            .expect("upsert");
        }

        let all = repo.find_all().expect("find all");
        let ids: Vec<i64> = all.iter().map(|s| s.user_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn upsert_replaces_an_existing_row() {
        let (repo, _dir) = repository();
        repo.upsert(&UserSetting {
            user_id: 1,
            monthly_working_hours: Some(160.0),
            exclude_keywords: Vec::new(),
        })
        .expect("insert");
        repo.upsert(&UserSetting {
            user_id: 1,
            monthly_working_hours: None,
            exclude_keywords: vec!["core day".to_string()],
        })
        .expect("update");

        let found = repo.find_by_user(1).expect("lookup").expect("row");
        assert_eq!(found.monthly_working_hours, None);
        assert_eq!(found.exclude_keywords, vec!["core day".to_string()]);
    }
}
