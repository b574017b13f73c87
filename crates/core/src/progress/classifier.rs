//! Status classifier backed by the persistent status cache.
//!
//! Classification is cache-first: once a status name has been stored
//! with any `is_completed` value, that value wins over the canonical
//! completed-name list on every later lookup. Unknown names are
//! classified against the canonical list and the verdict is persisted.

use std::sync::Arc;

use redtrack_domain::constants::{is_canonical_completed, COMPLETED_STATUS_NAMES};
use redtrack_domain::StatusDefinition;
use tracing::warn;

use super::ports::StatusRepository;

/// Classifier resolving status names to a completed/incomplete flag.
pub struct StatusClassifier {
    statuses: Arc<dyn StatusRepository>,
}

impl StatusClassifier {
    /// Create a classifier over the given status cache.
    pub fn new(statuses: Arc<dyn StatusRepository>) -> Self {
        Self { statuses }
    }

    /// Seed the cache with every canonical completed status name.
    ///
    /// Insert-only: a name that was already classified keeps its flag.
    /// Persistence failures are logged and skipped so startup never
    /// aborts on a single bad row.
    pub fn seed_defaults(&self) {
        for name in COMPLETED_STATUS_NAMES {
            let definition = StatusDefinition {
                name: (*name).to_string(),
                redmine_id: None,
                is_completed: true,
            };
            if let Err(err) = self.statuses.insert_if_absent(&definition) {
                warn!(status = *name, error = %err, "failed to seed status definition");
            }
        }
    }

    /// Resolve the completed flag for a status, caching the verdict.
    ///
    /// Local-recovery-first: a cache failure degrades to the canonical
    /// list instead of propagating.
    pub fn classify(&self, status_id: Option<i64>, status_name: &str) -> bool {
        match self.statuses.find_by_name(status_name) {
            Ok(Some(definition)) => return definition.is_completed,
            Ok(None) => {}
            Err(err) => {
                warn!(status = status_name, error = %err, "status lookup failed; using canonical list");
                return is_canonical_completed(status_name);
            }
        }

        let is_completed = is_canonical_completed(status_name);
        let definition = StatusDefinition {
            name: status_name.to_string(),
            redmine_id: status_id,
            is_completed,
        };
        if let Err(err) = self.statuses.insert_if_absent(&definition) {
            warn!(status = status_name, error = %err, "failed to persist status definition");
        }

        is_completed
    }
}
