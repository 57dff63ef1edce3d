use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One field-change record from an item's changelog, ordered by timestamp.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TransitionEvent {
    pub at: DateTime<Utc>,
    pub actor: Option<String>,
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TransitionEvent {
    pub fn is_status(&self) -> bool {
        self.field.eq_ignore_ascii_case("status")
    }

    pub fn is_assignee(&self) -> bool {
        self.field.eq_ignore_ascii_case("assignee")
    }

    pub fn is_labels(&self) -> bool {
        self.field.eq_ignore_ascii_case("labels")
    }
}
