//! Merges the analyzers' outputs into one ranked action list, steered by a
//! free-text context classified with plain keyword matching. A misread
//! intent degrades to the general path, never to an error.

use serde::{Deserialize, Serialize};

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::{PulseError, Result};
use crate::types::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    TicketSelection,
    Timing,
    Workload,
    Reviewer,
    General,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::TicketSelection => "ticket selection",
            Intent::Timing => "timing",
            Intent::Workload => "workload",
            Intent::Reviewer => "reviewer",
            Intent::General => "general",
        }
    }
}

pub fn classify(context: &str) -> Intent {
    let text = context.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if has(&["ticket", "issue", "pick", "next task", "what should i work"]) {
        Intent::TicketSelection
    } else if has(&["when", "time of day", "hour", "schedule", "morning", "evening"]) {
        Intent::Timing
    } else if has(&["load", "workload", "too much", "capacity", "burnout", "overwhelmed"]) {
        Intent::Workload
    } else if has(&["review", "reviewer", "pair", "who should", "collaborat"]) {
        Intent::Reviewer
    } else {
        Intent::General
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub text: String,
    pub rank: usize,
}

/// Runs all analyzers concurrently (none depends on another's result) and
/// merges their recommendation strings, intent-relevant categories first.
pub async fn recommend(
    engine: &Engine,
    subject: &str,
    context: &str,
    opts: &AnalyzeOpts,
) -> Result<Vec<Recommendation>> {
    if subject.trim().is_empty() {
        return Err(PulseError::MissingSubject);
    }

    let intent = classify(context);

    let (timing, load, strength, trend, burnout, chemistry) = tokio::join!(
        engine.timing(subject, opts),
        engine.load(subject, opts),
        engine.strength(subject, opts),
        engine.trend(subject, opts),
        engine.burnout(subject, opts),
        engine.collaboration(subject, opts),
    );

    // Burnout escalations outrank everything when risk is real.
    let burnout = burnout?;
    let burnout_urgent = matches!(
        &burnout.outcome,
        Outcome::Ready(r) if r.score >= 50
    );

    let mut groups: Vec<(&str, Vec<String>, usize)> = vec![
        ("timing", timing?.recommendations, weight(intent, Intent::Timing)),
        ("workload", load?.recommendations, weight(intent, Intent::Workload)),
        (
            "strengths",
            strength?.recommendations,
            weight(intent, Intent::TicketSelection),
        ),
        ("trends", trend?.recommendations, 3),
        (
            "burnout",
            burnout.recommendations,
            if burnout_urgent { 0 } else { weight(intent, Intent::Workload) },
        ),
        (
            "collaboration",
            chemistry?.recommendations,
            weight(intent, Intent::Reviewer),
        ),
    ];
    groups.sort_by_key(|(_, _, w)| *w);

    let mut merged = Vec::new();
    for (category, texts, _) in groups {
        for text in texts {
            merged.push(Recommendation {
                category: category.to_string(),
                text,
                rank: merged.len() + 1,
            });
        }
    }
    Ok(merged)
}

fn weight(actual: Intent, category_intent: Intent) -> usize {
    if actual == category_intent {
        1
    } else if actual == Intent::General {
        2
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_classification() {
        assert_eq!(classify("which ticket should I pick up next"), Intent::TicketSelection);
        assert_eq!(classify("when do I do my best work"), Intent::Timing);
        assert_eq!(classify("is my workload sustainable"), Intent::Workload);
        assert_eq!(classify("who should review my PR"), Intent::Reviewer);
        assert_eq!(classify("how am I doing overall"), Intent::General);
        assert_eq!(classify(""), Intent::General);
    }
}
