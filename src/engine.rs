//! The analysis engine: wires the issue source, the cache, and the tunable
//! parameters, and exposes one entry point per analyzer. Fetching, caching,
//! and wall-clock budgets live here; the analyzers themselves are pure.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::analyzers::burnout::{self, BurnoutInputs, BurnoutResult};
use crate::analyzers::collaboration::{self, CollaborationResult};
use crate::analyzers::load::{self, LoadCurve, LoadResult};
use crate::analyzers::prediction::{self, PredictionResult};
use crate::analyzers::strength::{self, StrengthResult};
use crate::analyzers::timing::{self, TimingResult};
use crate::analyzers::trend::{self, TrendResult};
use crate::cache::{ns, AnalysisCache};
use crate::config::AnalysisParams;
use crate::error::Result;
use crate::metrics::{collect_records, ItemRecord};
use crate::source::{items_or_empty, IssueSource};
use crate::types::{Analysis, Outcome, TransitionEvent};

/// Per-call knobs threaded through every analyzer entry point.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOpts {
    /// Lookback window override; `None` uses the configured default.
    pub since_days: Option<i64>,
    /// Skip cache reads for this call. Writes still happen.
    pub bypass_cache: bool,
    /// Maximum wall-clock budget. On timeout the engine falls back to a
    /// stale cached value, then to an insufficient-data result.
    pub budget: Option<Duration>,
}

pub struct Engine {
    source: Arc<dyn IssueSource>,
    cache: AnalysisCache,
    params: AnalysisParams,
    projects: Vec<String>,
}

impl Engine {
    pub fn new(
        source: Arc<dyn IssueSource>,
        cache: AnalysisCache,
        params: AnalysisParams,
        projects: Vec<String>,
    ) -> Self {
        Self {
            source,
            cache,
            params,
            projects,
        }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn invalidate(&self, subject: &str) -> Result<()> {
        self.cache.invalidate_all(subject)
    }

    /// Derived metrics for the subject's history, cache-first. One item's
    /// changelog fetch failing degrades that item to zeroed metrics only.
    async fn records(&self, subject: &str, opts: &AnalyzeOpts) -> Result<Vec<ItemRecord>> {
        if !opts.bypass_cache {
            if let Some(hit) = self.cache.get::<Vec<ItemRecord>>(ns::METRICS, subject) {
                debug!("metrics cache hit for {subject} ({} records)", hit.len());
                return Ok(hit);
            }
        }

        let since = opts.since_days.unwrap_or(self.params.since_days);
        let items = items_or_empty(
            self.source.fetch_items(subject, since).await,
            "history fetch",
        );
        let vocab = self.params.vocabulary();
        let records = collect_records(
            self.source.as_ref(),
            items,
            &vocab,
            self.params.fetch_parallelism,
        )
        .await;

        self.cache
            .set(ns::METRICS, subject, &records, self.params.cache_ttl_hours)?;
        Ok(records)
    }

    /// Cache-first wrapper shared by the analyzer entry points. Entries are
    /// keyed by subject alone; `valid` rejects cached payloads whose inputs
    /// no longer match (e.g. a forecast for a different day budget), which
    /// keeps every key reachable by `invalidate_all`.
    async fn run_cached<T, V, F, Fut>(
        &self,
        namespace: &str,
        subject: &str,
        opts: &AnalyzeOpts,
        valid: V,
        compute: F,
    ) -> Result<Analysis<T>>
    where
        T: Serialize + DeserializeOwned,
        V: Fn(&T) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Analysis<T>>>,
    {
        if !opts.bypass_cache {
            if let Some(hit) = self.cache.get::<Analysis<T>>(namespace, subject) {
                if hit.outcome.ready().map_or(true, &valid) {
                    debug!("{namespace} cache hit for {subject}");
                    return Ok(hit);
                }
            }
        }

        let fresh = match opts.budget {
            Some(budget) => match tokio::time::timeout(budget, compute()).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!("{namespace} analysis for {subject} timed out after {budget:?}");
                    return Ok(self
                        .cache
                        .get_stale::<Analysis<T>>(namespace, subject)
                        .filter(|hit| hit.outcome.ready().map_or(true, &valid))
                        .unwrap_or_else(|| {
                            Analysis::insufficient(
                                subject,
                                0,
                                "the issue tracker did not answer within the time budget",
                            )
                        }));
                }
            },
            None => compute().await?,
        };

        self.cache
            .set(namespace, subject, &fresh, self.params.cache_ttl_hours)?;
        Ok(fresh)
    }

    pub async fn timing(&self, subject: &str, opts: &AnalyzeOpts) -> Result<Analysis<TimingResult>> {
        self.run_cached(ns::TIMING, subject, opts, |_| true, || async move {
            let records = self.records(subject, opts).await?;
            let result = timing::analyze(&records, self.params.min_hour_samples);
            let recs = timing::recommendations(&result);
            Ok(Analysis::ready(subject, records.len(), recs, result))
        })
        .await
    }

    pub async fn load(&self, subject: &str, opts: &AnalyzeOpts) -> Result<Analysis<LoadResult>> {
        // The curve is cacheable; the current load never is, because it
        // must reflect right now.
        let snapshot = self
            .run_cached(ns::LOAD, subject, opts, |_| true, || async move {
                let records = self.records(subject, opts).await?;
                let curve = load::build_curve(&records, Utc::now());
                Ok(Analysis::ready(subject, records.len(), Vec::new(), curve))
            })
            .await?;

        let active = items_or_empty(
            self.source.fetch_active_items(subject).await,
            "active item fetch",
        );
        let current_load = active.len();

        Ok(self.assemble_load(snapshot, current_load))
    }

    fn assemble_load(
        &self,
        snapshot: Analysis<LoadCurve>,
        current_load: usize,
    ) -> Analysis<LoadResult> {
        let Analysis {
            subject,
            confidence,
            data_points,
            last_updated,
            recommendations,
            outcome,
        } = snapshot;

        let (optimal_min, optimal_max) =
            (self.params.optimal_load_min, self.params.optimal_load_max);
        let status = load::status_for(current_load, optimal_min, optimal_max);

        match outcome {
            Outcome::Ready(curve) => {
                let result = LoadResult {
                    curve,
                    current_load,
                    status,
                    optimal_min,
                    optimal_max,
                };
                let recommendations = load::recommendations(&result);
                Analysis {
                    subject,
                    confidence,
                    data_points,
                    last_updated,
                    recommendations,
                    outcome: Outcome::Ready(result),
                }
            }
            Outcome::InsufficientData { reason } => Analysis {
                subject,
                confidence,
                data_points,
                last_updated,
                recommendations,
                outcome: Outcome::InsufficientData { reason },
            },
        }
    }

    pub async fn strength(
        &self,
        subject: &str,
        opts: &AnalyzeOpts,
    ) -> Result<Analysis<StrengthResult>> {
        self.run_cached(ns::STRENGTH, subject, opts, |_| true, || async move {
            let records = self.records(subject, opts).await?;

            // Team comparison failure must not fail the analysis.
            let since = opts.since_days.unwrap_or(self.params.since_days);
            let team_items = items_or_empty(
                self.source.fetch_team_items(&self.projects, since).await,
                "team baseline fetch",
            );
            let vocab = self.params.vocabulary();
            let team = collect_records(
                self.source.as_ref(),
                team_items,
                &vocab,
                self.params.fetch_parallelism,
            )
            .await;

            let result = strength::analyze(&records, &team);
            let recs = strength::recommendations(&result);
            Ok(Analysis::ready(subject, records.len(), recs, result))
        })
        .await
    }

    pub async fn trend(&self, subject: &str, opts: &AnalyzeOpts) -> Result<Analysis<TrendResult>> {
        self.run_cached(ns::TREND, subject, opts, |_| true, || async move {
            let records = self.records(subject, opts).await?;
            let result = trend::analyze(&records, Utc::now());
            let recs = trend::recommendations(&result);
            Ok(Analysis::ready(subject, records.len(), recs, result))
        })
        .await
    }

    pub async fn burnout(
        &self,
        subject: &str,
        opts: &AnalyzeOpts,
    ) -> Result<Analysis<BurnoutResult>> {
        self.run_cached(ns::BURNOUT, subject, opts, |_| true, || async move {
            let records = self.records(subject, opts).await?;
            let active = items_or_empty(
                self.source.fetch_active_items(subject).await,
                "active item fetch",
            );
            let load_status = load::status_for(
                active.len(),
                self.params.optimal_load_min,
                self.params.optimal_load_max,
            );
            let timing_result = timing::analyze(&records, self.params.min_hour_samples);

            let outcome = burnout::analyze(&BurnoutInputs {
                records: &records,
                load_status,
                danger_zone: timing_result.danger.as_ref(),
                now: Utc::now(),
                min_samples: self.params.burnout_min_samples,
            });

            Ok(match outcome {
                Outcome::Ready(result) => {
                    let recs = burnout::recommendations(&result);
                    Analysis::ready(subject, records.len(), recs, result)
                }
                Outcome::InsufficientData { reason } => {
                    Analysis::insufficient(subject, records.len(), &reason)
                }
            })
        })
        .await
    }

    pub async fn collaboration(
        &self,
        subject: &str,
        opts: &AnalyzeOpts,
    ) -> Result<Analysis<CollaborationResult>> {
        self.run_cached(ns::CHEMISTRY, subject, opts, |_| true, || async move {
            let records = self.records(subject, opts).await?;
            let transitions: BTreeMap<String, Vec<TransitionEvent>> = records
                .iter()
                .filter(|r| !r.assignee_events.is_empty())
                .map(|r| (r.item.id.clone(), r.assignee_events.clone()))
                .collect();

            let outcome = collaboration::analyze(
                subject,
                &records,
                &transitions,
                self.params.chemistry_min_items,
            );

            Ok(match outcome {
                Outcome::Ready(result) => {
                    let recs = collaboration::recommendations(&result);
                    Analysis::ready(subject, records.len(), recs, result)
                }
                Outcome::InsufficientData { reason } => {
                    Analysis::insufficient(subject, records.len(), &reason)
                }
            })
        })
        .await
    }

    pub async fn predict(
        &self,
        subject: &str,
        budget_days: f64,
        opts: &AnalyzeOpts,
    ) -> Result<Analysis<PredictionResult>> {
        // The day budget shapes the payload; a cached forecast for a
        // different budget reads as a miss rather than getting its own key.
        let same_budget = |r: &PredictionResult| r.budget_days == budget_days;
        self.run_cached(ns::PREDICTION, subject, opts, same_budget, || async move {
            let records = self.records(subject, opts).await?;
            let active = items_or_empty(
                self.source.fetch_active_items(subject).await,
                "active item fetch",
            );

            let mut rng = rand::rng();
            let outcome = prediction::analyze(
                &active,
                &records,
                budget_days,
                self.params.monte_carlo_trials,
                &mut rng,
            );

            Ok(match outcome {
                Outcome::Ready(result) => {
                    let recs = prediction::recommendations(&result);
                    Analysis::ready(subject, records.len(), recs, result)
                }
                Outcome::InsufficientData { reason } => {
                    Analysis::insufficient(subject, records.len(), &reason)
                }
            })
        })
        .await
    }
}
