mod metrics;
mod report;
mod transition;
mod work_item;

pub use metrics::IssueMetrics;
pub use report::{Analysis, Confidence, Outcome};
pub use transition::TransitionEvent;
pub use work_item::{StatusClass, StatusVocabulary, WorkItem};
