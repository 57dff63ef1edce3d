//! Composite burnout risk: five weighted signals summed into a 0-100
//! score. Too little data reports as exactly that, never as "healthy".

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{load::LoadStatus, timing::DangerZone, weekly_buckets};
use crate::metrics::ItemRecord;
use crate::types::Outcome;

const LOOKBACK_WEEKS: usize = 8;
const VELOCITY_DROP_PCT: f64 = 20.0;
const CRUNCH_COMPLETIONS_PER_WEEK: usize = 8;
const CRUNCH_WEEKS_THRESHOLD: usize = 3;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BurnoutResult {
    pub score: u32,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RiskFactor {
    pub name: String,
    pub points: u32,
    pub detail: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Healthy,
    Warning,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => RiskLevel::Healthy,
            30..=49 => RiskLevel::Warning,
            50..=69 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Healthy => "healthy",
            RiskLevel::Warning => "warning",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

pub struct BurnoutInputs<'a> {
    pub records: &'a [ItemRecord],
    pub load_status: LoadStatus,
    pub danger_zone: Option<&'a DangerZone>,
    pub now: DateTime<Utc>,
    pub min_samples: usize,
}

pub fn analyze(inputs: &BurnoutInputs) -> Outcome<BurnoutResult> {
    if inputs.records.len() < inputs.min_samples {
        // Absence of risk factors is not the same as absence of data.
        return Outcome::InsufficientData {
            reason: format!(
                "{} items in the window, need at least {}",
                inputs.records.len(),
                inputs.min_samples
            ),
        };
    }

    let weeks = weekly_buckets(inputs.records, inputs.now, LOOKBACK_WEEKS);
    let mut factors = Vec::new();

    if let Some(factor) = sustained_overload(&weeks) {
        factors.push(factor);
    }
    if let Some(factor) = current_load(inputs.load_status) {
        factors.push(factor);
    }
    if let Some(factor) = declining_velocity(&weeks) {
        factors.push(factor);
    }
    if let Some(factor) = danger_hour_activity(inputs.danger_zone, inputs.now) {
        factors.push(factor);
    }
    if let Some(factor) = crunch_weeks(&weeks) {
        factors.push(factor);
    }

    let score = factors.iter().map(|f| f.points).sum::<u32>().min(100);
    Outcome::Ready(BurnoutResult {
        score,
        level: RiskLevel::from_score(score),
        factors,
    })
}

fn sustained_overload(weeks: &[super::WeekBucket]) -> Option<RiskFactor> {
    let overload_weeks = weeks
        .iter()
        .filter(|w| w.created > w.completed)
        .count();
    if overload_weeks < 2 {
        return None;
    }
    let points = match overload_weeks {
        2..=3 => 20,
        4..=5 => 30,
        _ => 40,
    };
    Some(RiskFactor {
        name: "sustained overload".into(),
        points,
        detail: format!(
            "{overload_weeks} of the last {LOOKBACK_WEEKS} weeks added more work than they closed"
        ),
    })
}

fn current_load(status: LoadStatus) -> Option<RiskFactor> {
    let points = match status {
        LoadStatus::Over => 15,
        LoadStatus::Critical => 25,
        LoadStatus::Under | LoadStatus::Optimal => return None,
    };
    Some(RiskFactor {
        name: "current load".into(),
        points,
        detail: format!("current workload is {}", status.label()),
    })
}

fn declining_velocity(weeks: &[super::WeekBucket]) -> Option<RiskFactor> {
    if weeks.len() < LOOKBACK_WEEKS {
        return None;
    }
    let early: f64 = weeks[..4].iter().map(|w| w.completed as f64).sum::<f64>() / 4.0;
    let recent: f64 = weeks[weeks.len() - 4..]
        .iter()
        .map(|w| w.completed as f64)
        .sum::<f64>()
        / 4.0;
    if early <= 0.0 {
        return None;
    }
    let drop_pct = (early - recent) / early * 100.0;
    if drop_pct <= VELOCITY_DROP_PCT {
        return None;
    }
    // 15 points at a 20% drop, scaling linearly to 30 at total stall.
    let points = (15.0 + (drop_pct - VELOCITY_DROP_PCT) / 80.0 * 15.0).min(30.0) as u32;
    Some(RiskFactor {
        name: "declining velocity".into(),
        points,
        detail: format!("weekly completions dropped {drop_pct:.0}% over the lookback window"),
    })
}

fn danger_hour_activity(danger: Option<&DangerZone>, now: DateTime<Utc>) -> Option<RiskFactor> {
    let zone = danger?;
    if !super::timing::in_danger_zone(zone, now.hour()) {
        return None;
    }
    Some(RiskFactor {
        name: "danger-hour activity".into(),
        points: 10,
        detail: format!(
            "working now, inside your low-quality window {:02}:00-{:02}:00",
            zone.start_hour,
            zone.end_hour + 1
        ),
    })
}

fn crunch_weeks(weeks: &[super::WeekBucket]) -> Option<RiskFactor> {
    let crunch = weeks
        .iter()
        .filter(|w| w.completed >= CRUNCH_COMPLETIONS_PER_WEEK)
        .count();
    if crunch < CRUNCH_WEEKS_THRESHOLD {
        return None;
    }
    Some(RiskFactor {
        name: "crunch weeks".into(),
        points: 15,
        detail: format!(
            "{crunch} of the last {LOOKBACK_WEEKS} weeks closed {CRUNCH_COMPLETIONS_PER_WEEK}+ items"
        ),
    })
}

pub fn recommendations(result: &BurnoutResult) -> Vec<String> {
    let mut recs = Vec::new();
    match result.level {
        RiskLevel::Healthy => {
            recs.push("Workload pattern looks sustainable; no action needed.".to_string())
        }
        RiskLevel::Warning => recs.push(
            "Early signs of strain; protect at least one meeting-free recovery day this week."
                .to_string(),
        ),
        RiskLevel::High => recs.push(
            "Sustained strain detected; defer new commitments and talk to your lead about load."
                .to_string(),
        ),
        RiskLevel::Critical => recs.push(
            "Critical burnout risk; reduce active work now and consider taking time off."
                .to_string(),
        ),
    }
    for factor in &result.factors {
        recs.push(format!("{}: {}.", factor.name, factor.detail));
    }
    recs
}
