//! End-to-end engine behavior over a scripted in-memory issue source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

use devpulse::cache::AnalysisCache;
use devpulse::config::AnalysisParams;
use devpulse::engine::{AnalyzeOpts, Engine};
use devpulse::error::{PulseError, Result};
use devpulse::metrics::collect_records;
use devpulse::source::IssueSource;
use devpulse::store::MemoryStore;
use devpulse::types::{Confidence, Outcome, StatusVocabulary, TransitionEvent, WorkItem};

#[derive(Default)]
struct FakeSource {
    items: Vec<WorkItem>,
    active: Vec<WorkItem>,
    transitions: HashMap<String, Vec<TransitionEvent>>,
    failing_transitions: Vec<String>,
    fetch_calls: AtomicUsize,
    delay: Option<Duration>,
}

#[async_trait]
impl IssueSource for FakeSource {
    async fn fetch_items(&self, _subject: &str, _since_days: i64) -> Result<Vec<WorkItem>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.items.clone())
    }

    async fn fetch_active_items(&self, _subject: &str) -> Result<Vec<WorkItem>> {
        Ok(self.active.clone())
    }

    async fn fetch_transitions(&self, item_id: &str) -> Result<Vec<TransitionEvent>> {
        if self.failing_transitions.iter().any(|id| id == item_id) {
            return Err(PulseError::ApiError {
                status: 500,
                message: "changelog unavailable".into(),
            });
        }
        Ok(self.transitions.get(item_id).cloned().unwrap_or_default())
    }

    async fn fetch_team_items(
        &self,
        _projects: &[String],
        _since_days: i64,
    ) -> Result<Vec<WorkItem>> {
        Ok(Vec::new())
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap()
}

fn work_item(id: &str, day_offset: i64, resolved: bool) -> WorkItem {
    let created = base_time() + ChronoDuration::days(day_offset);
    WorkItem {
        id: id.to_string(),
        key: format!("PROJ-{id}"),
        item_type: "Task".to_string(),
        status: if resolved { "Done" } else { "In Progress" }.to_string(),
        assignee: Some("alice".to_string()),
        created,
        updated: created + ChronoDuration::days(3),
        resolved: resolved.then(|| created + ChronoDuration::days(3)),
        story_points: None,
        components: vec![],
        labels: vec![],
        project: "PROJ".to_string(),
    }
}

fn status_transitions(item: &WorkItem) -> Vec<TransitionEvent> {
    vec![
        TransitionEvent {
            at: item.created,
            actor: Some("alice".into()),
            field: "status".into(),
            from: Some("To Do".into()),
            to: Some("In Progress".into()),
        },
        TransitionEvent {
            at: item.created + ChronoDuration::days(3),
            actor: Some("alice".into()),
            field: "status".into(),
            from: Some("In Progress".into()),
            to: Some("Done".into()),
        },
    ]
}

fn engine_with(source: FakeSource) -> Engine {
    Engine::new(
        Arc::new(source),
        AnalysisCache::new(Box::new(MemoryStore::default())),
        AnalysisParams::default(),
        vec![],
    )
}

fn populated_source(count: usize) -> FakeSource {
    let mut source = FakeSource::default();
    for i in 0..count {
        let item = work_item(&i.to_string(), i as i64, true);
        source.transitions.insert(item.id.clone(), status_transitions(&item));
        source.items.push(item);
    }
    source
}

#[tokio::test]
async fn four_items_reports_insufficient_data_with_low_confidence() {
    let engine = engine_with(populated_source(4));
    let opts = AnalyzeOpts::default();

    let burnout = engine.burnout("alice", &opts).await.unwrap();
    assert!(burnout.outcome.is_insufficient());
    assert_eq!(burnout.confidence, Confidence::Low);
    assert_eq!(burnout.data_points, 4);
    assert!(!burnout.recommendations.is_empty());

    let chemistry = engine.collaboration("alice", &opts).await.unwrap();
    assert!(chemistry.outcome.is_insufficient());
    assert_eq!(chemistry.confidence, Confidence::Low);
}

#[tokio::test]
async fn second_call_hits_the_cache() {
    let engine = engine_with(populated_source(12));
    let opts = AnalyzeOpts::default();

    let first = engine.timing("alice", &opts).await.unwrap();
    assert!(first.outcome.ready().is_some());
    let second = engine.timing("alice", &opts).await.unwrap();
    assert_eq!(second.last_updated, first.last_updated);
}

#[tokio::test]
async fn bypass_cache_forces_recompute() {
    let engine = engine_with(populated_source(12));

    let opts = AnalyzeOpts::default();
    engine.trend("alice", &opts).await.unwrap();
    engine.trend("alice", &opts).await.unwrap();

    let bypass = AnalyzeOpts {
        bypass_cache: true,
        ..Default::default()
    };
    let fresh = engine.trend("alice", &bypass).await.unwrap();
    assert!(fresh.outcome.ready().is_some());
}

#[tokio::test]
async fn one_failing_changelog_does_not_poison_the_batch() {
    let mut source = populated_source(3);
    source.failing_transitions.push("1".to_string());
    let items = source.items.clone();

    let records = collect_records(&source, items, &StatusVocabulary::default(), 4).await;
    assert_eq!(records.len(), 3);

    let failed = records.iter().find(|r| r.item.id == "1").unwrap();
    assert_eq!(failed.metrics.cycle_time_days, 0.0);

    let ok = records.iter().find(|r| r.item.id == "0").unwrap();
    assert_eq!(ok.metrics.cycle_time_days, 3.0);
}

#[tokio::test]
async fn timeout_returns_insufficient_data_instead_of_blocking() {
    let mut source = populated_source(12);
    source.delay = Some(Duration::from_secs(30));
    let engine = engine_with(source);

    let opts = AnalyzeOpts {
        budget: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let analysis = engine.timing("alice", &opts).await.unwrap();
    assert!(analysis.outcome.is_insufficient());
    assert_eq!(analysis.confidence, Confidence::Low);
}

#[tokio::test]
async fn prediction_runs_end_to_end() {
    let mut source = populated_source(20);
    source.active = (100..104)
        .map(|i| work_item(&i.to_string(), 10, false))
        .collect();
    let engine = engine_with(source);

    let analysis = engine
        .predict("alice", 14.0, &AnalyzeOpts::default())
        .await
        .unwrap();
    let result = analysis.outcome.ready().expect("prediction should run");
    assert_eq!(result.active_items, 4);
    assert_eq!(result.trials, 1000);
    // History is uniformly 3-day cycles, so 4 items always fit 14 days.
    assert_eq!(result.completion_probability, 1.0);
    assert!(result.ci_low <= result.ci_high);
}

#[tokio::test]
async fn cache_clear_forces_prediction_recompute() {
    let mut source = populated_source(20);
    source.active = (100..104)
        .map(|i| work_item(&i.to_string(), 10, false))
        .collect();
    let source = Arc::new(source);
    let engine = Engine::new(
        source.clone(),
        AnalysisCache::new(Box::new(MemoryStore::default())),
        AnalysisParams::default(),
        vec![],
    );
    let opts = AnalyzeOpts::default();

    engine.predict("alice", 14.0, &opts).await.unwrap();
    engine.predict("alice", 14.0, &opts).await.unwrap();
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 1);

    engine.invalidate("alice").unwrap();
    engine.predict("alice", 14.0, &opts).await.unwrap();
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn changed_budget_is_not_served_from_the_prediction_cache() {
    let mut source = populated_source(20);
    source.active = (100..104)
        .map(|i| work_item(&i.to_string(), 10, false))
        .collect();
    let engine = engine_with(source);
    let opts = AnalyzeOpts::default();

    let wide = engine.predict("alice", 14.0, &opts).await.unwrap();
    assert_eq!(wide.outcome.ready().unwrap().budget_days, 14.0);

    let tight = engine.predict("alice", 3.0, &opts).await.unwrap();
    assert_eq!(tight.outcome.ready().unwrap().budget_days, 3.0);
}

#[tokio::test]
async fn chemistry_detects_handoff_partner() {
    let mut source = populated_source(12);
    // Give every item an assignee hand-off from bob.
    for item in &source.items {
        source
            .transitions
            .get_mut(&item.id)
            .unwrap()
            .push(TransitionEvent {
                at: item.created + ChronoDuration::days(1),
                actor: Some("bob".into()),
                field: "assignee".into(),
                from: Some("bob".into()),
                to: Some("alice".into()),
            });
    }
    let engine = engine_with(source);

    let analysis = engine
        .collaboration("alice", &AnalyzeOpts::default())
        .await
        .unwrap();
    let result = analysis.outcome.ready().expect("should have enough items");
    assert_eq!(result.partners.len(), 1);
    assert_eq!(result.partners[0].collaborator, "bob");
    assert_eq!(result.partners[0].shared_items, 12);
}
