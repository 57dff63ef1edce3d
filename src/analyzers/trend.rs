//! Monthly velocity/quality series, skills evolution across the window,
//! and a first-half/second-half period comparison.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{mean, mean_cycle_time, month_key};
use crate::metrics::ItemRecord;

const TREND_CHANGE_PCT: f64 = 10.0;
const SKILL_SHIFT_PCT: f64 = 20.0;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TrendResult {
    pub velocity: Vec<MonthPoint>,
    pub velocity_trend: TrendDirection,
    pub quality: Vec<MonthPoint>,
    pub quality_trend: TrendDirection,
    pub skills: Vec<SkillShift>,
    pub periods: PeriodComparison,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MonthPoint {
    pub month: String,
    pub value: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    /// >10% movement in either direction counts as a transition.
    fn classify(previous: f64, current: f64) -> Self {
        if previous <= 0.0 {
            return TrendDirection::Stable;
        }
        let change = (current - previous) / previous * 100.0;
        if change > TREND_CHANGE_PCT {
            TrendDirection::Up
        } else if change < -TREND_CHANGE_PCT {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SkillShift {
    pub item_type: String,
    pub first_half: usize,
    pub second_half: usize,
    pub growth_pct: f64,
    pub direction: TrendDirection,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PeriodComparison {
    pub first: PeriodMetrics,
    pub second: PeriodMetrics,
    pub completed_delta_pct: f64,
    pub cycle_delta_pct: f64,
    pub quality_delta_pct: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct PeriodMetrics {
    pub completed: usize,
    pub avg_cycle_days: f64,
    pub avg_quality: f64,
    pub defect_rate: f64,
}

pub fn analyze(records: &[ItemRecord], now: DateTime<Utc>) -> TrendResult {
    let resolved: Vec<&ItemRecord> = records.iter().filter(|r| r.item.resolved.is_some()).collect();

    let mut by_month: BTreeMap<String, Vec<&ItemRecord>> = BTreeMap::new();
    for record in &resolved {
        let month = month_key(record.item.resolved.unwrap_or(now));
        by_month.entry(month).or_default().push(record);
    }

    let velocity: Vec<MonthPoint> = by_month
        .iter()
        .map(|(month, group)| MonthPoint {
            month: month.clone(),
            value: group.len() as f64,
        })
        .collect();
    let quality: Vec<MonthPoint> = by_month
        .iter()
        .map(|(month, group)| MonthPoint {
            month: month.clone(),
            value: mean(&group.iter().map(|r| r.metrics.quality_score()).collect::<Vec<_>>()),
        })
        .collect();

    TrendResult {
        velocity_trend: last_pair_direction(&velocity),
        quality_trend: last_pair_direction(&quality),
        velocity,
        quality,
        skills: skills_evolution(records, now),
        periods: period_comparison(records, now),
    }
}

fn last_pair_direction(series: &[MonthPoint]) -> TrendDirection {
    if series.len() < 2 {
        return TrendDirection::Stable;
    }
    let previous = series[series.len() - 2].value;
    let current = series[series.len() - 1].value;
    TrendDirection::classify(previous, current)
}

/// Midpoint of the observed window: halfway between the earliest creation
/// and `now`.
fn window_midpoint(records: &[ItemRecord], now: DateTime<Utc>) -> DateTime<Utc> {
    let start = records.iter().map(|r| r.item.created).min().unwrap_or(now);
    start + (now - start) / 2
}

fn skills_evolution(records: &[ItemRecord], now: DateTime<Utc>) -> Vec<SkillShift> {
    let midpoint = window_midpoint(records, now);

    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let slot = counts.entry(&record.item.item_type).or_default();
        if record.item.created < midpoint {
            slot.0 += 1;
        } else {
            slot.1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(item_type, (first, second))| {
            let growth_pct = if first > 0 {
                (second as f64 - first as f64) / first as f64 * 100.0
            } else if second > 0 {
                100.0
            } else {
                0.0
            };
            let direction = if growth_pct >= SKILL_SHIFT_PCT {
                TrendDirection::Up
            } else if growth_pct <= -SKILL_SHIFT_PCT {
                TrendDirection::Down
            } else {
                TrendDirection::Stable
            };
            SkillShift {
                item_type: item_type.to_string(),
                first_half: first,
                second_half: second,
                growth_pct,
                direction,
            }
        })
        .collect()
}

fn period_comparison(records: &[ItemRecord], now: DateTime<Utc>) -> PeriodComparison {
    let midpoint = window_midpoint(records, now);
    let (first, second): (Vec<&ItemRecord>, Vec<&ItemRecord>) =
        records.iter().partition(|r| r.item.created < midpoint);

    let first = period_metrics(&first);
    let second = period_metrics(&second);

    let pct = |a: f64, b: f64| if a > 0.0 { (b - a) / a * 100.0 } else { 0.0 };
    PeriodComparison {
        completed_delta_pct: pct(first.completed as f64, second.completed as f64),
        cycle_delta_pct: pct(first.avg_cycle_days, second.avg_cycle_days),
        quality_delta_pct: pct(first.avg_quality, second.avg_quality),
        first,
        second,
    }
}

fn period_metrics(records: &[&ItemRecord]) -> PeriodMetrics {
    if records.is_empty() {
        return PeriodMetrics::default();
    }
    let completed = records.iter().filter(|r| r.item.resolved.is_some()).count();
    PeriodMetrics {
        completed,
        avg_cycle_days: mean_cycle_time(records).unwrap_or(0.0),
        avg_quality: mean(&records.iter().map(|r| r.metrics.quality_score()).collect::<Vec<_>>()),
        defect_rate: records.iter().filter(|r| r.metrics.defect).count() as f64
            / records.len() as f64,
    }
}

pub fn recommendations(result: &TrendResult) -> Vec<String> {
    let mut recs = Vec::new();
    match result.velocity_trend {
        TrendDirection::Down => recs.push(
            "Monthly throughput is trending down; check whether scope or interruptions grew."
                .to_string(),
        ),
        TrendDirection::Up => {
            recs.push("Throughput is climbing month over month; keep the current rhythm.".to_string())
        }
        TrendDirection::Stable => {}
    }
    if result.quality_trend == TrendDirection::Down {
        recs.push(
            "Quality scores are slipping; budget more review time before picking up new work."
                .to_string(),
        );
    }
    for shift in &result.skills {
        if shift.direction == TrendDirection::Up && shift.second_half >= 3 {
            recs.push(format!(
                "Your {} work grew {:.0}% in the recent half of the window; worth noting in reviews.",
                shift.item_type, shift.growth_pct
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

    fn record(day: i64, item_type: &str, resolved_after: Option<i64>) -> ItemRecord {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let created = base + Duration::days(day);
        ItemRecord {
            item: WorkItem {
                id: format!("{day}-{item_type}"),
                key: "T-1".into(),
                item_type: item_type.into(),
                status: "Done".into(),
                assignee: None,
                created,
                updated: created,
                resolved: resolved_after.map(|d| created + Duration::days(d)),
                story_points: None,
                components: vec![],
                labels: vec![],
                project: "T".into(),
            },
            metrics: IssueMetrics {
                cycle_time_days: 2.0,
                ..Default::default()
            },
            assignee_events: vec![],
        }
    }

    #[test]
    fn trend_classification_thresholds() {
        assert_eq!(TrendDirection::classify(10.0, 11.1), TrendDirection::Up);
        assert_eq!(TrendDirection::classify(10.0, 8.9), TrendDirection::Down);
        assert_eq!(TrendDirection::classify(10.0, 10.5), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(10.0, 9.5), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(0.0, 5.0), TrendDirection::Stable);
    }

    #[test]
    fn velocity_counts_resolutions_per_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 9, 0, 0).unwrap();
        // Three resolved in January, one in February.
        let records = vec![
            record(0, "Task", Some(1)),
            record(2, "Task", Some(1)),
            record(5, "Task", Some(1)),
            record(35, "Task", Some(1)),
        ];
        let result = analyze(&records, now);
        assert_eq!(result.velocity.len(), 2);
        assert_eq!(result.velocity[0].value, 3.0);
        assert_eq!(result.velocity[1].value, 1.0);
        assert_eq!(result.velocity_trend, TrendDirection::Down);
    }

    #[test]
    fn skills_shift_detects_growth() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        // Window Jan 1 to Mar 1, midpoint ~Jan 30. One Bug early, three late.
        let records = vec![
            record(0, "Bug", Some(1)),
            record(40, "Bug", Some(1)),
            record(45, "Bug", Some(1)),
            record(50, "Bug", Some(1)),
        ];
        let result = analyze(&records, now);
        let shift = &result.skills[0];
        assert_eq!(shift.first_half, 1);
        assert_eq!(shift.second_half, 3);
        assert_eq!(shift.growth_pct, 200.0);
        assert_eq!(shift.direction, TrendDirection::Up);
    }

    #[test]
    fn period_comparison_reports_both_halves() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let records = vec![
            record(0, "Task", Some(1)),
            record(5, "Task", None),
            record(45, "Task", Some(1)),
            record(50, "Task", Some(1)),
        ];
        let result = analyze(&records, now);
        assert_eq!(result.periods.first.completed, 1);
        assert_eq!(result.periods.second.completed, 2);
        assert_eq!(result.periods.completed_delta_pct, 100.0);
    }
}
