//! External issue source implementations.
//!
//! [`HttpIssueSource`] talks to a real Redmine instance; the
//! [`MockIssueSource`] serves a deterministic offline dataset for demos
//! and development without credentials.

pub mod client;
pub mod mock;

use std::sync::Arc;

use redtrack_core::IssueSource;
use redtrack_domain::{RedmineConfig, Result};
use tracing::info;

pub use client::HttpIssueSource;
pub use mock::MockIssueSource;

/// Build the issue source selected by configuration.
pub fn build_issue_source(config: &RedmineConfig) -> Result<Arc<dyn IssueSource>> {
    if config.use_mock {
        info!("using the deterministic offline issue source");
        return Ok(Arc::new(MockIssueSource::new()));
    }
    Ok(Arc::new(HttpIssueSource::new(config.base_url.clone(), config.api_key.clone())?))
}
