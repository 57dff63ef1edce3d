//! Per-type and per-component cycle-time deltas against a team baseline,
//! plus component expertise tiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{mean, mean_cycle_time};
use crate::metrics::ItemRecord;

const MIN_GROUP_ITEMS: usize = 3;
const MIN_TEAM_SAMPLE: usize = 6;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StrengthResult {
    pub by_type: Vec<TypeDelta>,
    pub by_component: Vec<ComponentExpertise>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TypeDelta {
    pub item_type: String,
    pub items: usize,
    pub user_avg_cycle: f64,
    pub team_avg_cycle: f64,
    /// `(userMean − teamMean) / teamMean × 100`; negative means faster.
    pub delta_pct: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ComponentExpertise {
    pub component: String,
    pub items: usize,
    pub avg_quality: f64,
    pub tier: ExpertiseTier,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseTier {
    Expert,
    Proficient,
    Competent,
    Developing,
}

impl ExpertiseTier {
    fn from_stats(items: usize, quality: f64) -> Self {
        if items >= 20 && quality >= 8.0 {
            ExpertiseTier::Expert
        } else if items >= 10 && quality >= 6.5 {
            ExpertiseTier::Proficient
        } else if items >= 5 && quality >= 5.0 {
            ExpertiseTier::Competent
        } else {
            ExpertiseTier::Developing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpertiseTier::Expert => "expert",
            ExpertiseTier::Proficient => "proficient",
            ExpertiseTier::Competent => "competent",
            ExpertiseTier::Developing => "developing",
        }
    }
}

/// `team` is the baseline sample; pass an empty slice when the team fetch
/// failed and deltas collapse to zero rather than failing the analysis.
pub fn analyze(records: &[ItemRecord], team: &[ItemRecord]) -> StrengthResult {
    StrengthResult {
        by_type: type_deltas(records, team),
        by_component: component_expertise(records),
    }
}

fn type_deltas(records: &[ItemRecord], team: &[ItemRecord]) -> Vec<TypeDelta> {
    let mut groups: BTreeMap<&str, Vec<&ItemRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(&record.item.item_type).or_default().push(record);
    }

    groups
        .into_iter()
        .filter(|(_, group)| group.len() >= MIN_GROUP_ITEMS)
        .filter_map(|(item_type, group)| {
            let user_avg = mean_cycle_time(&group)?;

            let comparable: Vec<&ItemRecord> = team
                .iter()
                .filter(|r| r.item.item_type == item_type && r.metrics.cycle_time_days > 0.0)
                .collect();
            let (team_avg, delta_pct) = if comparable.len() >= MIN_TEAM_SAMPLE {
                let team_avg = mean_cycle_time(&comparable).unwrap_or(user_avg);
                (team_avg, (user_avg - team_avg) / team_avg * 100.0)
            } else {
                // No usable baseline: neutral comparison, never a failure.
                (user_avg, 0.0)
            };

            Some(TypeDelta {
                item_type: item_type.to_string(),
                items: group.len(),
                user_avg_cycle: user_avg,
                team_avg_cycle: team_avg,
                delta_pct,
            })
        })
        .collect()
}

fn component_expertise(records: &[ItemRecord]) -> Vec<ComponentExpertise> {
    let mut groups: BTreeMap<&str, Vec<&ItemRecord>> = BTreeMap::new();
    for record in records {
        for component in &record.item.components {
            groups.entry(component).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .filter(|(_, group)| group.len() >= MIN_GROUP_ITEMS)
        .map(|(component, group)| {
            let quality = mean(&group.iter().map(|r| r.metrics.quality_score()).collect::<Vec<_>>());
            ComponentExpertise {
                component: component.to_string(),
                items: group.len(),
                avg_quality: quality,
                tier: ExpertiseTier::from_stats(group.len(), quality),
            }
        })
        .collect()
}

pub fn recommendations(result: &StrengthResult) -> Vec<String> {
    let mut recs = Vec::new();
    if let Some(best) = result
        .by_type
        .iter()
        .min_by(|a, b| a.delta_pct.total_cmp(&b.delta_pct))
    {
        if best.delta_pct < -10.0 {
            recs.push(format!(
                "You resolve {} work {:.0}% faster than the team baseline; volunteer for those.",
                best.item_type,
                -best.delta_pct
            ));
        }
    }
    if let Some(worst) = result
        .by_type
        .iter()
        .max_by(|a, b| a.delta_pct.total_cmp(&b.delta_pct))
    {
        if worst.delta_pct > 10.0 {
            recs.push(format!(
                "{} items take you {:.0}% longer than the team; pair up or split them smaller.",
                worst.item_type, worst.delta_pct
            ));
        }
    }
    for component in &result.by_component {
        if component.tier == ExpertiseTier::Expert {
            recs.push(format!(
                "You are the resident expert on {} ({} items at {:.1}/10 quality); expect review requests there.",
                component.component, component.items, component.avg_quality
            ));
        }
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueMetrics, WorkItem};
    use chrono::{TimeZone, Utc};

    fn record(item_type: &str, cycle: f64, components: &[&str]) -> ItemRecord {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        ItemRecord {
            item: WorkItem {
                id: format!("{item_type}-{cycle}"),
                key: "T-1".into(),
                item_type: item_type.into(),
                status: "Done".into(),
                assignee: None,
                created: at,
                updated: at,
                resolved: Some(at),
                story_points: None,
                components: components.iter().map(|s| s.to_string()).collect(),
                labels: vec![],
                project: "T".into(),
            },
            metrics: IssueMetrics {
                cycle_time_days: cycle,
                ..Default::default()
            },
            assignee_events: vec![],
        }
    }

    #[test]
    fn negative_delta_means_faster_than_team() {
        let user: Vec<ItemRecord> = (0..4).map(|_| record("Bug", 4.0, &[])).collect();
        let team: Vec<ItemRecord> = (0..8).map(|_| record("Bug", 8.0, &[])).collect();

        let result = analyze(&user, &team);
        let delta = &result.by_type[0];
        assert_eq!(delta.delta_pct, -50.0);
        assert_eq!(delta.team_avg_cycle, 8.0);
    }

    #[test]
    fn missing_team_baseline_collapses_to_zero_delta() {
        let user: Vec<ItemRecord> = (0..4).map(|_| record("Bug", 4.0, &[])).collect();
        let result = analyze(&user, &[]);
        let delta = &result.by_type[0];
        assert_eq!(delta.delta_pct, 0.0);
        assert_eq!(delta.team_avg_cycle, delta.user_avg_cycle);
    }

    #[test]
    fn small_groups_are_skipped() {
        let user = vec![record("Bug", 4.0, &[]), record("Bug", 5.0, &[])];
        assert!(analyze(&user, &[]).by_type.is_empty());
    }

    #[test]
    fn expertise_tiers() {
        assert_eq!(ExpertiseTier::from_stats(25, 9.0), ExpertiseTier::Expert);
        assert_eq!(ExpertiseTier::from_stats(12, 7.0), ExpertiseTier::Proficient);
        assert_eq!(ExpertiseTier::from_stats(6, 5.5), ExpertiseTier::Competent);
        assert_eq!(ExpertiseTier::from_stats(4, 9.0), ExpertiseTier::Developing);
        assert_eq!(ExpertiseTier::from_stats(25, 4.0), ExpertiseTier::Developing);
    }
}
