//! Turns an item's ordered transition log into a fixed [`IssueMetrics`]
//! record. One bad item degrades to zeroed metrics; it never aborts the
//! batch.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::source::IssueSource;
use crate::types::{IssueMetrics, StatusClass, StatusVocabulary, TransitionEvent, WorkItem};

const SECS_PER_DAY: f64 = 86_400.0;
const SECS_PER_HOUR: f64 = 3_600.0;

/// A work item paired with its derived metrics; the unit every analyzer
/// consumes. Assignee-change events are kept so the collaboration analyzer
/// can infer hand-offs without re-fetching changelogs.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ItemRecord {
    pub item: WorkItem,
    pub metrics: IssueMetrics,
    #[serde(default)]
    pub assignee_events: Vec<TransitionEvent>,
}

impl ItemRecord {
    pub fn new(item: WorkItem, metrics: IssueMetrics) -> Self {
        Self {
            item,
            metrics,
            assignee_events: Vec::new(),
        }
    }
}

/// Derive metrics from one item's transition history.
pub fn derive_metrics(
    item: &WorkItem,
    transitions: &[TransitionEvent],
    vocab: &StatusVocabulary,
) -> IssueMetrics {
    let mut metrics = IssueMetrics::default();
    if transitions.is_empty() {
        return metrics;
    }

    let mut started: Option<DateTime<Utc>> = None;
    let mut done: Option<DateTime<Utc>> = None;
    let mut current_class: Option<(StatusClass, DateTime<Utc>)> = None;
    let mut seen_done = false;

    for event in transitions {
        if event.is_labels() {
            if let Some(added) = &event.to {
                if added
                    .split_whitespace()
                    .any(|label| vocab.is_defect_label(label))
                {
                    metrics.defect = true;
                }
            }
            continue;
        }

        if !event.is_status() {
            continue;
        }

        let from_class = event.from.as_deref().map(|s| vocab.classify(s));
        let to_class = event.to.as_deref().map(|s| vocab.classify(s));

        // Close out the open interval for the status we are leaving.
        if let Some((class, entered)) = current_class.take() {
            let hours = (event.at - entered).num_seconds() as f64 / SECS_PER_HOUR;
            match class {
                StatusClass::InProgress => metrics.in_progress_hours += hours.max(0.0),
                StatusClass::InReview => metrics.review_hours += hours.max(0.0),
                _ => {}
            }
        }

        match to_class {
            Some(StatusClass::InProgress) => {
                if started.is_none() {
                    started = Some(event.at);
                }
                if seen_done {
                    metrics.reopened = true;
                }
                if from_class == Some(StatusClass::InReview) {
                    metrics.revisions += 1;
                }
                current_class = Some((StatusClass::InProgress, event.at));
            }
            Some(StatusClass::InReview) => {
                current_class = Some((StatusClass::InReview, event.at));
            }
            Some(StatusClass::Done) => {
                seen_done = true;
                if done.is_none() {
                    done = Some(event.at);
                }
                current_class = Some((StatusClass::Done, event.at));
            }
            Some(StatusClass::Open) => {
                if seen_done {
                    metrics.reopened = true;
                }
                current_class = Some((StatusClass::Open, event.at));
            }
            None => {
                current_class = None;
            }
        }
    }
    // A status interval still open at the end of the log contributes zero.

    // Lead time runs from creation to the first done transition; cycle time
    // additionally needs an in-progress start. An item moved straight to
    // done has a lead time but no cycle time.
    if let Some(end) = done {
        metrics.lead_time_days = ((end - item.created).num_seconds() as f64 / SECS_PER_DAY).max(0.0);
        if let Some(start) = started {
            metrics.cycle_time_days = ((end - start).num_seconds() as f64 / SECS_PER_DAY).max(0.0);
        }
    }

    metrics
}

/// Fetch transition logs for a batch of items with bounded parallelism and
/// derive metrics for each. Individual fetch failures are isolated: the
/// item keeps zeroed metrics and its siblings proceed.
pub async fn collect_records(
    source: &dyn IssueSource,
    items: Vec<WorkItem>,
    vocab: &StatusVocabulary,
    parallelism: usize,
) -> Vec<ItemRecord> {
    stream::iter(items)
        .map(|item| async move {
            let (metrics, assignee_events) = match source.fetch_transitions(&item.id).await {
                Ok(transitions) => {
                    let metrics = derive_metrics(&item, &transitions, vocab);
                    let events = transitions
                        .into_iter()
                        .filter(TransitionEvent::is_assignee)
                        .collect();
                    (metrics, events)
                }
                Err(e) => {
                    warn!("transition fetch for {} failed, using zeroed metrics: {e}", item.key);
                    (IssueMetrics::default(), Vec::new())
                }
            };
            ItemRecord {
                item,
                metrics,
                assignee_events,
            }
        })
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: i64, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap() + chrono::Duration::days(day)
    }

    fn status(day: i64, from: &str, to: &str) -> TransitionEvent {
        TransitionEvent {
            at: at(day, 9),
            actor: Some("alice".into()),
            field: "status".into(),
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    fn item() -> WorkItem {
        WorkItem {
            id: "1".into(),
            key: "PROJ-1".into(),
            item_type: "Task".into(),
            status: "Done".into(),
            assignee: Some("alice".into()),
            created: at(0, 9),
            updated: at(5, 9),
            resolved: Some(at(5, 9)),
            story_points: None,
            components: vec![],
            labels: vec![],
            project: "PROJ".into(),
        }
    }

    #[test]
    fn cycle_time_from_in_progress_to_done() {
        let transitions = vec![
            status(0, "To Do", "In Progress"),
            status(5, "In Progress", "Done"),
        ];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert_eq!(m.cycle_time_days, 5.0);
        assert_eq!(m.lead_time_days, 5.0);
        assert!(!m.reopened);
    }

    #[test]
    fn straight_to_done_has_lead_time_but_no_cycle_time() {
        let transitions = vec![status(5, "To Do", "Done")];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert_eq!(m.cycle_time_days, 0.0);
        assert_eq!(m.lead_time_days, 5.0);
    }

    #[test]
    fn no_done_transition_means_zero_cycle_and_lead() {
        let transitions = vec![status(0, "To Do", "In Progress")];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert_eq!(m.cycle_time_days, 0.0);
        assert_eq!(m.lead_time_days, 0.0);
    }

    #[test]
    fn empty_log_yields_default_metrics() {
        let m = derive_metrics(&item(), &[], &StatusVocabulary::default());
        assert_eq!(m, IssueMetrics::default());
    }

    #[test]
    fn reopened_after_done() {
        let transitions = vec![
            status(0, "To Do", "In Progress"),
            status(2, "In Progress", "Done"),
            status(4, "Done", "In Progress"),
        ];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert!(m.reopened);

        let never_closed = vec![status(0, "To Do", "In Progress")];
        let m = derive_metrics(&item(), &never_closed, &StatusVocabulary::default());
        assert!(!m.reopened);
    }

    #[test]
    fn revisions_count_review_roundtrips() {
        let transitions = vec![
            status(0, "To Do", "In Progress"),
            status(1, "In Progress", "In Review"),
            status(2, "In Review", "In Progress"),
            status(3, "In Progress", "In Review"),
            status(4, "In Review", "In Progress"),
            status(5, "In Progress", "Done"),
        ];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert_eq!(m.revisions, 2);
        // Two in-progress days before each review, plus the final day.
        assert_eq!(m.in_progress_hours, 72.0);
        assert_eq!(m.review_hours, 48.0);
    }

    #[test]
    fn defect_flag_from_label_transition() {
        let transitions = vec![TransitionEvent {
            at: at(1, 9),
            actor: None,
            field: "labels".into(),
            from: None,
            to: Some("regression urgent".into()),
        }];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert!(m.defect);
    }

    #[test]
    fn open_interval_never_closed_contributes_zero() {
        let transitions = vec![
            status(0, "To Do", "In Progress"),
            status(1, "In Progress", "In Review"),
        ];
        let m = derive_metrics(&item(), &transitions, &StatusVocabulary::default());
        assert_eq!(m.in_progress_hours, 24.0);
        assert_eq!(m.review_hours, 0.0);
    }
}
