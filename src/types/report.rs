use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative confidence tier derived from sample count.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_samples(n: usize) -> Self {
        if n >= 30 {
            Confidence::High
        } else if n >= 10 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Analyzer payload or an explicit insufficient-data marker. Distinct from
/// an error: too few samples is a valid answer, not a failure.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    InsufficientData { reason: String },
}

impl<T> Outcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(t) => Some(t),
            Outcome::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Outcome::InsufficientData { .. })
    }
}

/// The uniform envelope every analyzer returns. The aggregator and the
/// renderers only rely on this shape.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Analysis<T> {
    pub subject: String,
    pub confidence: Confidence,
    pub data_points: usize,
    pub last_updated: DateTime<Utc>,
    pub recommendations: Vec<String>,
    pub outcome: Outcome<T>,
}

impl<T> Analysis<T> {
    pub fn ready(
        subject: &str,
        data_points: usize,
        recommendations: Vec<String>,
        payload: T,
    ) -> Self {
        Self {
            subject: subject.to_string(),
            confidence: Confidence::from_samples(data_points),
            data_points,
            last_updated: Utc::now(),
            recommendations,
            outcome: Outcome::Ready(payload),
        }
    }

    pub fn insufficient(subject: &str, data_points: usize, reason: &str) -> Self {
        Self {
            subject: subject.to_string(),
            confidence: Confidence::Low,
            data_points,
            last_updated: Utc::now(),
            recommendations: vec![format!(
                "Not enough history yet: {reason}. Results improve as more items resolve."
            )],
            outcome: Outcome::InsufficientData {
                reason: reason.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_monotonic_in_sample_count() {
        let mut prev = Confidence::from_samples(0);
        for n in 1..100 {
            let c = Confidence::from_samples(n);
            assert!(c >= prev, "confidence dropped at n={n}");
            prev = c;
        }
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(Confidence::from_samples(9), Confidence::Low);
        assert_eq!(Confidence::from_samples(10), Confidence::Medium);
        assert_eq!(Confidence::from_samples(30), Confidence::High);
    }
}
