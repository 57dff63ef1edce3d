use serde::{Deserialize, Serialize};

/// Per-item performance metrics derived from the transition log.
///
/// Zeroed when the log is missing or malformed; a zero cycle time means
/// "unknown", never "instant", so analyzers filter on `cycle_time_days > 0`
/// before averaging.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct IssueMetrics {
    pub cycle_time_days: f64,
    pub lead_time_days: f64,
    pub in_progress_hours: f64,
    pub review_hours: f64,
    pub reopened: bool,
    pub defect: bool,
    pub revisions: u32,
}

impl IssueMetrics {
    /// Quality score in [0, 10]: rework and defects pull it down.
    pub fn quality_score(&self) -> f64 {
        let score = 10.0
            - if self.reopened { 3.0 } else { 0.0 }
            - if self.defect { 3.0 } else { 0.0 }
            - 0.5 * f64::from(self.revisions);
        score.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_floors_at_zero() {
        let m = IssueMetrics {
            reopened: true,
            defect: true,
            revisions: 20,
            ..Default::default()
        };
        assert_eq!(m.quality_score(), 0.0);
    }

    #[test]
    fn quality_score_clean_item_is_ten() {
        assert_eq!(IssueMetrics::default().quality_score(), 10.0);
    }

    #[test]
    fn quality_score_penalizes_revisions() {
        let m = IssueMetrics {
            revisions: 3,
            ..Default::default()
        };
        assert_eq!(m.quality_score(), 8.5);
    }
}
