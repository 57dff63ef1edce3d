//! The seven analyzers. Each is a pure function over derived item records;
//! fetching, caching, and timeout policy live in the engine.

pub mod burnout;
pub mod collaboration;
pub mod load;
pub mod prediction;
pub mod strength;
pub mod timing;
pub mod trend;

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::metrics::ItemRecord;

/// Mean of the non-zero cycle times in a slice. Zero cycle time means
/// "unknown", so those records never pull the average down.
pub(crate) fn mean_cycle_time(records: &[&ItemRecord]) -> Option<f64> {
    let cycles: Vec<f64> = records
        .iter()
        .map(|r| r.metrics.cycle_time_days)
        .filter(|c| *c > 0.0)
        .collect();
    if cycles.is_empty() {
        None
    } else {
        Some(cycles.iter().sum::<f64>() / cycles.len() as f64)
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Per-week created/completed counts for the trailing `weeks` weeks,
/// oldest first. Week 0 starts `weeks` weeks before `now`.
pub(crate) fn weekly_buckets(
    records: &[ItemRecord],
    now: DateTime<Utc>,
    weeks: usize,
) -> Vec<WeekBucket> {
    let window_start = now - Duration::weeks(weeks as i64);
    let mut buckets = vec![WeekBucket::default(); weeks];

    let index_of = |at: DateTime<Utc>| -> Option<usize> {
        if at < window_start || at > now {
            return None;
        }
        let idx = ((at - window_start).num_days() / 7) as usize;
        Some(idx.min(weeks - 1))
    };

    for record in records {
        if let Some(idx) = index_of(record.item.created) {
            buckets[idx].created += 1;
        }
        if let Some(resolved) = record.item.resolved {
            if let Some(idx) = index_of(resolved) {
                buckets[idx].completed += 1;
            }
        }
    }
    buckets
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WeekBucket {
    pub created: usize,
    pub completed: usize,
}

/// `YYYY-MM` key for monthly grouping.
pub(crate) fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}
