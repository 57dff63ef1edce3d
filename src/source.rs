use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::types::{TransitionEvent, WorkItem};

/// The issue-tracker boundary. Pagination and retry live behind this trait;
/// the analytics core never sees partial pages.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Items assigned to the subject, resolved-or-updated within the window.
    async fn fetch_items(&self, subject: &str, since_days: i64) -> Result<Vec<WorkItem>>;

    /// Items currently assigned and unresolved.
    async fn fetch_active_items(&self, subject: &str) -> Result<Vec<WorkItem>>;

    /// Full changelog for one item, ordered by timestamp ascending.
    async fn fetch_transitions(&self, item_id: &str) -> Result<Vec<TransitionEvent>>;

    /// Team baseline sample across the given projects, all assignees.
    async fn fetch_team_items(&self, projects: &[String], since_days: i64)
        -> Result<Vec<WorkItem>>;
}

/// Adapter errors degrade to empty results. The tracker being down costs
/// freshness, never correctness of the analysis run.
pub fn items_or_empty(result: Result<Vec<WorkItem>>, context: &str) -> Vec<WorkItem> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!("{context} failed, continuing with empty results: {e}");
            Vec::new()
        }
    }
}
