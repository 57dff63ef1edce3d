//! Personal developer-performance analytics over issue-tracker history.
//!
//! The pipeline: an [`source::IssueSource`] adapter fetches work items and
//! their transition logs, [`metrics`] derives per-item performance metrics,
//! the [`analyzers`] turn those into timing/load/strength/trend/burnout/
//! chemistry/prediction results, and [`recommend`] merges everything into a
//! ranked action list. [`cache`] makes repeated analysis affordable.

pub mod analyzers;
pub mod cache;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod output;
pub mod recommend;
pub mod responses;
pub mod source;
pub mod store;
pub mod types;
