//! Collaboration chemistry: who the subject hands work to or from, and
//! whether shared items move faster than solo ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::mean_cycle_time;
use crate::metrics::ItemRecord;
use crate::types::{Outcome, TransitionEvent};

const STRONG_MULTIPLIER: f64 = 1.2;
const WEAK_MULTIPLIER: f64 = 0.8;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CollaborationResult {
    pub solo_avg_cycle: f64,
    pub solo_items: usize,
    pub partners: Vec<Chemistry>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Chemistry {
    pub collaborator: String,
    pub shared_items: usize,
    pub avg_cycle_days: f64,
    /// Solo mean cycle over shared mean; above 1 means shared work is faster.
    pub speed_multiplier: f64,
    pub score: u32,
    pub rating: Rating,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Neutral,
    NeedsWork,
}

impl Rating {
    fn from_score(score: u32) -> Self {
        match score {
            80..=100 => Rating::Excellent,
            60..=79 => Rating::Good,
            40..=59 => Rating::Neutral,
            _ => Rating::NeedsWork,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "excellent",
            Rating::Good => "good",
            Rating::Neutral => "neutral",
            Rating::NeedsWork => "needs work",
        }
    }
}

/// Chemistry score: starts at 50, adjusted by relative speed and by how
/// often the pair actually works together, clamped to [0, 100].
fn chemistry_score(speed_multiplier: f64, shared_items: usize) -> u32 {
    let mut score: i64 = 50;
    if speed_multiplier > STRONG_MULTIPLIER {
        score += 30;
    } else if speed_multiplier > 1.0 {
        score += 15;
    } else if speed_multiplier < WEAK_MULTIPLIER {
        score -= 20;
    }
    if shared_items > 10 {
        score += 20;
    } else if shared_items > 5 {
        score += 10;
    }
    score.clamp(0, 100) as u32
}

/// `transitions` maps item id to its changelog; collaborators are inferred
/// from assignee-change events and from items whose assignee is not the
/// subject.
pub fn analyze(
    subject: &str,
    records: &[ItemRecord],
    transitions: &BTreeMap<String, Vec<TransitionEvent>>,
    min_items: usize,
) -> Outcome<CollaborationResult> {
    if records.len() < min_items {
        return Outcome::InsufficientData {
            reason: format!(
                "{} items in the window, need at least {min_items} to infer collaboration",
                records.len()
            ),
        };
    }

    let mut shared: BTreeMap<String, Vec<&ItemRecord>> = BTreeMap::new();
    let mut solo: Vec<&ItemRecord> = Vec::new();

    for record in records {
        let mut partners: Vec<String> = Vec::new();
        if let Some(events) = transitions.get(&record.item.id) {
            for event in events.iter().filter(|e| e.is_assignee()) {
                for identity in [&event.from, &event.to].into_iter().flatten() {
                    if identity != subject && !partners.contains(identity) {
                        partners.push(identity.clone());
                    }
                }
            }
        }
        if let Some(assignee) = &record.item.assignee {
            if assignee != subject && !partners.contains(assignee) {
                partners.push(assignee.clone());
            }
        }

        if partners.is_empty() {
            solo.push(record);
        } else {
            for partner in partners {
                shared.entry(partner).or_default().push(record);
            }
        }
    }

    let solo_avg = mean_cycle_time(&solo).unwrap_or(0.0);

    let partners = shared
        .into_iter()
        .filter_map(|(collaborator, items)| {
            let shared_avg = mean_cycle_time(&items)?;
            let speed_multiplier = if shared_avg > 0.0 && solo_avg > 0.0 {
                solo_avg / shared_avg
            } else {
                1.0
            };
            let score = chemistry_score(speed_multiplier, items.len());
            Some(Chemistry {
                collaborator,
                shared_items: items.len(),
                avg_cycle_days: shared_avg,
                speed_multiplier,
                score,
                rating: Rating::from_score(score),
            })
        })
        .collect::<Vec<_>>();

    let mut partners = partners;
    partners.sort_by(|a, b| b.score.cmp(&a.score));

    Outcome::Ready(CollaborationResult {
        solo_avg_cycle: solo_avg,
        solo_items: solo.len(),
        partners,
    })
}

pub fn recommendations(result: &CollaborationResult) -> Vec<String> {
    let mut recs = Vec::new();
    if let Some(best) = result.partners.first() {
        if best.rating == Rating::Excellent || best.rating == Rating::Good {
            recs.push(format!(
                "Work shared with {} moves {:.0}% faster than your solo pace; a strong default reviewer.",
                best.collaborator,
                (best.speed_multiplier - 1.0) * 100.0
            ));
        }
    }
    for partner in &result.partners {
        if partner.rating == Rating::NeedsWork && partner.shared_items > 5 {
            recs.push(format!(
                "Hand-offs with {} run slower than solo work; agree on interfaces earlier.",
                partner.collaborator
            ));
        }
    }
    if recs.is_empty() {
        recs.push("No strong collaboration signal either way yet.".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueMetrics, WorkItem};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, assignee: &str, cycle: f64) -> ItemRecord {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        ItemRecord {
            item: WorkItem {
                id: id.into(),
                key: id.into(),
                item_type: "Task".into(),
                status: "Done".into(),
                assignee: Some(assignee.into()),
                created: at,
                updated: at,
                resolved: Some(at),
                story_points: None,
                components: vec![],
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
    fn fast_frequent_partner_rates_excellent() {
        // 12 shared items at 7d vs solo mean 10d: multiplier ~1.43,
        // 50 + 30 + 20 clamps to 100.
        let mut records: Vec<ItemRecord> = (0..12)
            .map(|i| record(&format!("s{i}"), "bob", 7.0))
            .collect();
        records.extend((0..4).map(|i| record(&format!("o{i}"), "alice", 10.0)));

        let outcome = analyze("alice", &records, &BTreeMap::new(), 10);
        let result = outcome.ready().unwrap();
        let bob = &result.partners[0];
        assert_eq!(bob.shared_items, 12);
        assert!((bob.speed_multiplier - 10.0 / 7.0).abs() < 1e-9);
        assert_eq!(bob.score, 100);
        assert_eq!(bob.rating, Rating::Excellent);
    }

    #[test]
    fn slow_partner_loses_points() {
        assert_eq!(chemistry_score(0.7, 2), 30);
        assert_eq!(Rating::from_score(30), Rating::NeedsWork);
    }

    #[test]
    fn too_few_items_is_insufficient_data() {
        let records: Vec<ItemRecord> = (0..4).map(|i| record(&format!("{i}"), "bob", 5.0)).collect();
        assert!(analyze("alice", &records, &BTreeMap::new(), 10).is_insufficient());
    }

    #[test]
    fn assignee_change_events_imply_collaboration() {
        let mut records: Vec<ItemRecord> =
            (0..9).map(|i| record(&format!("{i}"), "alice", 8.0)).collect();
        records.push(record("handoff", "alice", 4.0));

        let mut transitions = BTreeMap::new();
        transitions.insert(
            "handoff".to_string(),
            vec![TransitionEvent {
                at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
                actor: Some("carol".into()),
                field: "assignee".into(),
                from: Some("carol".into()),
                to: Some("alice".into()),
            }],
        );

        let outcome = analyze("alice", &records, &transitions, 10);
        let result = outcome.ready().unwrap();
        assert_eq!(result.partners.len(), 1);
        assert_eq!(result.partners[0].collaborator, "carol");
        assert_eq!(result.partners[0].shared_items, 1);
    }
}
