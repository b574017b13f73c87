//! In-memory repository doubles mirroring the SQLite adapters.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use redtrack_core::{
    StatusRepository, TimeEntryRepository, UserRepository, UserSettingRepository,
};
use redtrack_domain::{RedTrackError, Result, StatusDefinition, TimeEntry, UserSetting};

/// Time-entry cache double. Set `fail_inserts` to simulate a broken
/// store during ingestion.
#[derive(Default)]
pub struct InMemoryTimeEntries {
    rows: Mutex<HashMap<i64, TimeEntry>>,
    pub fail_inserts: bool,
}

impl InMemoryTimeEntries {
    pub fn preloaded(entries: impl IntoIterator<Item = TimeEntry>) -> Self {
        let repo = Self::default();
        for entry in entries {
            repo.rows.lock().expect("lock").insert(entry.id, entry);
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("lock").len()
    }
}

impl TimeEntryRepository for InMemoryTimeEntries {
    fn insert_if_absent(&self, entry: &TimeEntry) -> Result<bool> {
        if self.fail_inserts {
            return Err(RedTrackError::Database("insert failed".into()));
        }
        let mut rows = self.rows.lock().expect("lock");
        if rows.contains_key(&entry.id) {
            return Ok(false);
        }
        rows.insert(entry.id, entry.clone());
        Ok(true)
    }

    fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        project_id: Option<i64>,
    ) -> Result<Vec<TimeEntry>> {
        let rows = self.rows.lock().expect("lock");
        let mut entries: Vec<TimeEntry> = rows
            .values()
            .filter(|entry| entry.spent_on >= start && entry.spent_on <= end)
            .filter(|entry| project_id.is_none() || entry.project_id == project_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.id);
        Ok(entries)
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<HashMap<i64, String>>,
}

impl InMemoryUsers {
    pub fn name_of(&self, id: i64) -> Option<String> {
        self.rows.lock().expect("lock").get(&id).cloned()
    }
}

impl UserRepository for InMemoryUsers {
    fn upsert(&self, id: i64, name: &str) -> Result<()> {
        self.rows.lock().expect("lock").insert(id, name.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStatuses {
    rows: Mutex<HashMap<String, StatusDefinition>>,
}

impl StatusRepository for InMemoryStatuses {
    fn find_by_name(&self, name: &str) -> Result<Option<StatusDefinition>> {
        Ok(self.rows.lock().expect("lock").get(name).cloned())
    }

    fn insert_if_absent(&self, definition: &StatusDefinition) -> Result<()> {
        self.rows
            .lock()
            .expect("lock")
            .entry(definition.name.clone())
            .or_insert_with(|| definition.clone());
        Ok(())
    }

    fn set_completed(&self, name: &str, is_completed: bool) -> Result<()> {
        if let Some(row) = self.rows.lock().expect("lock").get_mut(name) {
            row.is_completed = is_completed;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySettings {
    rows: Mutex<Vec<UserSetting>>,
}

impl InMemorySettings {
    pub fn with(settings: impl IntoIterator<Item = UserSetting>) -> Self {
        Self { rows: Mutex::new(settings.into_iter().collect()) }
    }
}

impl UserSettingRepository for InMemorySettings {
    fn find_all(&self) -> Result<Vec<UserSetting>> {
        Ok(self.rows.lock().expect("lock").clone())
    }
}
