//! Concurrent-load curve: how cycle time and defect rate respond to the
//! number of items in flight at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mean;
use crate::metrics::ItemRecord;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoadCurve {
    pub levels: Vec<LoadLevel>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoadLevel {
    pub concurrent: usize,
    pub items: usize,
    pub avg_cycle_days: f64,
    pub defect_rate: f64,
    pub completion_rate: f64,
    /// `(1/cycle) × (1−defectRate) × completionRate`; 0 when cycle unknown.
    pub score: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Under,
    Optimal,
    Over,
    Critical,
}

impl LoadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Under => "under capacity",
            LoadStatus::Optimal => "optimal",
            LoadStatus::Over => "over capacity",
            LoadStatus::Critical => "critical",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub curve: LoadCurve,
    pub current_load: usize,
    pub status: LoadStatus,
    pub optimal_min: usize,
    pub optimal_max: usize,
}

/// Concurrent load for each record: overlapping siblings plus the item
/// itself, floored at 1.
pub fn concurrent_loads(records: &[ItemRecord], now: DateTime<Utc>) -> Vec<usize> {
    records
        .iter()
        .map(|r| {
            let others = records
                .iter()
                .filter(|other| other.item.id != r.item.id && r.item.overlaps(&other.item, now))
                .count();
            (1 + others).max(1)
        })
        .collect()
}

pub fn build_curve(records: &[ItemRecord], now: DateTime<Utc>) -> LoadCurve {
    let loads = concurrent_loads(records, now);
    let max_load = loads.iter().copied().max().unwrap_or(0);

    let mut levels = Vec::new();
    for concurrent in 1..=max_load {
        let group: Vec<&ItemRecord> = records
            .iter()
            .zip(&loads)
            .filter(|(_, l)| **l == concurrent)
            .map(|(r, _)| r)
            .collect();
        if group.is_empty() {
            continue;
        }

        let cycles: Vec<f64> = group
            .iter()
            .filter(|r| r.metrics.cycle_time_days > 0.0)
            .map(|r| r.metrics.cycle_time_days)
            .collect();
        let avg_cycle = mean(&cycles);
        let defect_rate =
            group.iter().filter(|r| r.metrics.defect).count() as f64 / group.len() as f64;
        let completion_rate =
            group.iter().filter(|r| r.item.resolved.is_some()).count() as f64 / group.len() as f64;
        let score = if avg_cycle > 0.0 {
            (1.0 / avg_cycle) * (1.0 - defect_rate) * completion_rate
        } else {
            0.0
        };

        levels.push(LoadLevel {
            concurrent,
            items: group.len(),
            avg_cycle_days: avg_cycle,
            defect_rate,
            completion_rate,
            score,
        });
    }

    LoadCurve { levels }
}

/// Status zones partition the non-negative integers: under `[0, min)`,
/// optimal `[min, max]`, over `(max, max+3]`, critical above.
pub fn status_for(current: usize, optimal_min: usize, optimal_max: usize) -> LoadStatus {
    if current < optimal_min {
        LoadStatus::Under
    } else if current <= optimal_max {
        LoadStatus::Optimal
    } else if current <= optimal_max + 3 {
        LoadStatus::Over
    } else {
        LoadStatus::Critical
    }
}

pub fn recommendations(result: &LoadResult) -> Vec<String> {
    let mut recs = Vec::new();
    match result.status {
        LoadStatus::Under => recs.push(format!(
            "You have {} items in flight; there is room to pick up more (optimal band is {}-{}).",
            result.current_load, result.optimal_min, result.optimal_max
        )),
        LoadStatus::Optimal => recs.push(format!(
            "Current load of {} sits in your optimal band; hold it there.",
            result.current_load
        )),
        LoadStatus::Over => recs.push(format!(
            "Load of {} is above the optimal band ({}-{}); finish before starting anything new.",
            result.current_load, result.optimal_min, result.optimal_max
        )),
        LoadStatus::Critical => recs.push(format!(
            "Load of {} is critical; shed or delegate work before quality follows.",
            result.current_load
        )),
    }
    if let Some(best) = result
        .curve
        .levels
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
    {
        if best.score > 0.0 {
            recs.push(format!(
                "Historically you perform best around {} concurrent items ({:.1} day cycle, {:.0}% defect rate).",
                best.concurrent,
                best.avg_cycle_days,
                best.defect_rate * 100.0
            ));
        }
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueMetrics, WorkItem};
    use chrono::{Duration, TimeZone};

    fn item(id: &str, start_day: i64, end_day: Option<i64>) -> ItemRecord {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let created = base + Duration::days(start_day);
        let resolved = end_day.map(|d| base + Duration::days(d));
        ItemRecord {
            item: WorkItem {
                id: id.into(),
                key: id.into(),
                item_type: "Task".into(),
                status: "Done".into(),
                assignee: None,
                created,
                updated: resolved.unwrap_or(created),
                resolved,
                story_points: None,
                components: vec![],
                labels: vec![],
                project: "T".into(),
            },
            metrics: IssueMetrics {
                cycle_time_days: 3.0,
                ..Default::default()
            },
            assignee_events: vec![],
        }
    }

    #[test]
    fn three_mutually_overlapping_items_each_carry_load_three() {
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 9, 0, 0).unwrap();
        let records = vec![
            item("a", 0, Some(10)),
            item("b", 2, Some(12)),
            item("c", 4, Some(8)),
        ];
        assert_eq!(concurrent_loads(&records, now), vec![3, 3, 3]);
    }

    #[test]
    fn isolated_item_floors_at_load_one() {
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 9, 0, 0).unwrap();
        let records = vec![item("a", 0, Some(2)), item("b", 5, Some(7))];
        assert_eq!(concurrent_loads(&records, now), vec![1, 1]);
    }

    #[test]
    fn status_zones_partition_all_counts() {
        for n in 0..40 {
            let zones = [
                status_for(n, 5, 9) == LoadStatus::Under,
                status_for(n, 5, 9) == LoadStatus::Optimal,
                status_for(n, 5, 9) == LoadStatus::Over,
                status_for(n, 5, 9) == LoadStatus::Critical,
            ];
            assert_eq!(zones.iter().filter(|z| **z).count(), 1, "n={n}");
        }
        assert_eq!(status_for(4, 5, 9), LoadStatus::Under);
        assert_eq!(status_for(5, 5, 9), LoadStatus::Optimal);
        assert_eq!(status_for(9, 5, 9), LoadStatus::Optimal);
        assert_eq!(status_for(10, 5, 9), LoadStatus::Over);
        assert_eq!(status_for(12, 5, 9), LoadStatus::Over);
        assert_eq!(status_for(13, 5, 9), LoadStatus::Critical);
    }

    #[test]
    fn curve_scores_drop_with_defects() {
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 9, 0, 0).unwrap();
        let mut clean = item("a", 0, Some(3));
        let mut buggy = item("b", 10, Some(13));
        clean.metrics.defect = false;
        buggy.metrics.defect = true;

        let curve = build_curve(&[clean, buggy], now);
        assert_eq!(curve.levels.len(), 1);
        let level = &curve.levels[0];
        assert_eq!(level.concurrent, 1);
        assert_eq!(level.items, 2);
        assert_eq!(level.defect_rate, 0.5);
    }
}
