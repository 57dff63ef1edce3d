use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of tracked work, as fetched from the issue tracker.
/// Immutable for the duration of an analysis run.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WorkItem {
    pub id: String,
    /// Human-facing key, e.g. `PROJ-123`.
    pub key: String,
    pub item_type: String,
    pub status: String,
    pub assignee: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub resolved: Option<DateTime<Utc>>,
    pub story_points: Option<f64>,
    pub components: Vec<String>,
    pub labels: Vec<String>,
    pub project: String,
}

impl WorkItem {
    /// Active interval end: resolution time, or `now` for still-open items.
    pub fn active_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.resolved.unwrap_or(now)
    }

    /// True if this item's active interval overlaps another's.
    pub fn overlaps(&self, other: &WorkItem, now: DateTime<Utc>) -> bool {
        self.created < other.active_until(now) && other.created < self.active_until(now)
    }
}

/// Equivalence class a raw status name falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Open,
    InProgress,
    InReview,
    Done,
}

/// Maps site-specific status names and defect labels onto the fixed
/// equivalence classes the metrics pipeline works in. Matching is
/// case-insensitive; unknown statuses classify as Open.
#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    in_progress: Vec<String>,
    in_review: Vec<String>,
    done: Vec<String>,
    defect_labels: Vec<String>,
}

impl StatusVocabulary {
    pub fn new(
        in_progress: &[String],
        in_review: &[String],
        done: &[String],
        defect_labels: &[String],
    ) -> Self {
        let lower = |v: &[String]| v.iter().map(|s| s.to_lowercase()).collect();
        Self {
            in_progress: lower(in_progress),
            in_review: lower(in_review),
            done: lower(done),
            defect_labels: lower(defect_labels),
        }
    }

    pub fn classify(&self, status: &str) -> StatusClass {
        let status = status.to_lowercase();
        if self.done.iter().any(|s| *s == status) {
            StatusClass::Done
        } else if self.in_review.iter().any(|s| *s == status) {
            StatusClass::InReview
        } else if self.in_progress.iter().any(|s| *s == status) {
            StatusClass::InProgress
        } else {
            StatusClass::Open
        }
    }

    pub fn is_defect_label(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.defect_labels.iter().any(|d| *d == label)
    }
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        crate::config::AnalysisParams::default().vocabulary()
    }
}
