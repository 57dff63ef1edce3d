//! Monte Carlo sprint-completion prediction. Randomized sampling is
//! authoritative here; the trial count and the 10th/90th percentile bounds
//! are fixed inputs so reported confidence intervals stay comparable.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::metrics::ItemRecord;
use crate::types::{Outcome, WorkItem};

const CI_LOW_PERCENTILE: f64 = 0.10;
const CI_HIGH_PERCENTILE: f64 = 0.90;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Fraction of trials in which every active item completed in budget.
    pub completion_probability: f64,
    pub expected_completed: f64,
    /// 10th/90th percentile of the completed-count distribution.
    pub ci_low: usize,
    pub ci_high: usize,
    pub trials: u32,
    pub active_items: usize,
    pub budget_days: f64,
    pub at_risk: Vec<AtRiskItem>,
    pub scenarios: Vec<Scenario>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AtRiskItem {
    pub key: String,
    pub queue_position: usize,
    pub estimated_days: f64,
    pub severity: RiskSeverity,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// Sensitivity of the forecast to scope changes of a few items.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Scenario {
    pub item_delta: i32,
    pub completion_probability: f64,
    pub expected_completed: f64,
}

pub fn analyze<R: Rng>(
    active: &[WorkItem],
    history: &[ItemRecord],
    budget_days: f64,
    trials: u32,
    rng: &mut R,
) -> Outcome<PredictionResult> {
    let samples: Vec<f64> = history
        .iter()
        .map(|r| r.metrics.cycle_time_days)
        .filter(|c| *c > 0.0)
        .collect();
    if samples.is_empty() {
        return Outcome::InsufficientData {
            reason: "no historical cycle times to sample from".to_string(),
        };
    }
    if active.is_empty() {
        return Outcome::InsufficientData {
            reason: "no active items to forecast".to_string(),
        };
    }

    let base = simulate(active.len(), &samples, budget_days, trials, rng);

    let mean_cycle = samples.iter().sum::<f64>() / samples.len() as f64;
    let at_risk = flag_at_risk(active, mean_cycle, budget_days);

    let scenarios = [-2i32, -1, 1, 2]
        .iter()
        .filter_map(|delta| {
            let count = active.len() as i64 + i64::from(*delta);
            if count < 1 {
                return None;
            }
            let run = simulate(count as usize, &samples, budget_days, trials, rng);
            Some(Scenario {
                item_delta: *delta,
                completion_probability: run.probability,
                expected_completed: run.expected,
            })
        })
        .collect();

    Outcome::Ready(PredictionResult {
        completion_probability: base.probability,
        expected_completed: base.expected,
        ci_low: base.ci_low,
        ci_high: base.ci_high,
        trials,
        active_items: active.len(),
        budget_days,
        at_risk,
        scenarios,
    })
}

struct SimRun {
    probability: f64,
    expected: f64,
    ci_low: usize,
    ci_high: usize,
}

fn simulate<R: Rng>(
    item_count: usize,
    samples: &[f64],
    budget_days: f64,
    trials: u32,
    rng: &mut R,
) -> SimRun {
    let mut completed_counts = Vec::with_capacity(trials as usize);

    for _ in 0..trials {
        let mut elapsed = 0.0;
        let mut completed = 0usize;
        for _ in 0..item_count {
            elapsed += samples[rng.random_range(0..samples.len())];
            if elapsed > budget_days {
                break;
            }
            completed += 1;
        }
        completed_counts.push(completed);
    }

    let full = completed_counts.iter().filter(|c| **c == item_count).count();
    let expected =
        completed_counts.iter().sum::<usize>() as f64 / completed_counts.len() as f64;

    completed_counts.sort_unstable();
    let percentile = |p: f64| {
        let idx = ((completed_counts.len() as f64 * p) as usize)
            .min(completed_counts.len() - 1);
        completed_counts[idx]
    };

    SimRun {
        probability: full as f64 / trials as f64,
        expected,
        ci_low: percentile(CI_LOW_PERCENTILE),
        ci_high: percentile(CI_HIGH_PERCENTILE),
    }
}

/// Sequential estimate: item at queue position `i` lands around
/// `mean_cycle × i`. Items whose estimate overshoots the budget are
/// flagged, tiered by how far over they land.
fn flag_at_risk(active: &[WorkItem], mean_cycle: f64, budget_days: f64) -> Vec<AtRiskItem> {
    active
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let position = idx + 1;
            let estimated = mean_cycle * position as f64;
            if estimated <= budget_days {
                return None;
            }
            let overshoot = estimated / budget_days;
            let severity = if overshoot >= 1.5 {
                RiskSeverity::High
            } else if overshoot >= 1.2 {
                RiskSeverity::Medium
            } else {
                RiskSeverity::Low
            };
            Some(AtRiskItem {
                key: item.key.clone(),
                queue_position: position,
                estimated_days: estimated,
                severity,
            })
        })
        .collect()
}

pub fn recommendations(result: &PredictionResult) -> Vec<String> {
    let mut recs = Vec::new();
    recs.push(format!(
        "{:.0}% chance of finishing all {} items in {:.0} days; expect around {:.1} done (80% interval {}-{}).",
        result.completion_probability * 100.0,
        result.active_items,
        result.budget_days,
        result.expected_completed,
        result.ci_low,
        result.ci_high
    ));
    if result.completion_probability < 0.5 {
        if let Some(scenario) = result
            .scenarios
            .iter()
            .find(|s| s.item_delta == -1)
        {
            recs.push(format!(
                "Dropping one item raises the completion odds to {:.0}%.",
                scenario.completion_probability * 100.0
            ));
        }
    }
    for item in result.at_risk.iter().filter(|i| i.severity == RiskSeverity::High) {
        recs.push(format!(
            "{} sits at queue position {} with an estimated {:.1} days; descope or reorder it.",
            item.key, item.queue_position, item.estimated_days
        ));
    }
    recs
}
