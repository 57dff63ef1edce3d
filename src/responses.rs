//! Jira REST response envelopes shared by the client.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{TransitionEvent, WorkItem};

/// Paged search result (`/rest/api/2/search`).
#[derive(Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "startAt")]
    pub start_at: u32,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    pub total: u32,
    pub issues: Vec<IssueNode>,
}

#[derive(Deserialize)]
pub struct IssueNode {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
    pub changelog: Option<Changelog>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct IssueFields {
    pub issuetype: Option<NamedField>,
    pub status: Option<NamedField>,
    pub assignee: Option<UserField>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolutiondate: Option<String>,
    pub components: Vec<NamedField>,
    pub labels: Vec<String>,
    pub project: Option<KeyField>,
    /// Story points live in a site-specific custom field; this is the
    /// common cloud default.
    #[serde(rename = "customfield_10016")]
    pub story_points: Option<f64>,
}

#[derive(Deserialize)]
pub struct NamedField {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UserField {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct KeyField {
    pub key: String,
}

#[derive(Deserialize, Default)]
pub struct Changelog {
    #[serde(default)]
    pub histories: Vec<History>,
}

#[derive(Deserialize)]
pub struct History {
    pub created: String,
    pub author: Option<UserField>,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

#[derive(Deserialize)]
pub struct HistoryItem {
    pub field: String,
    #[serde(rename = "fromString")]
    pub from_string: Option<String>,
    #[serde(rename = "toString")]
    pub to_string: Option<String>,
}

/// Jira timestamps come as `2026-03-01T10:30:00.000+0000`; newer endpoints
/// use RFC 3339. Accept both.
pub fn parse_jira_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl IssueNode {
    pub fn into_work_item(self) -> Option<WorkItem> {
        let created = parse_jira_time(self.fields.created.as_deref()?)?;
        let updated = self
            .fields
            .updated
            .as_deref()
            .and_then(parse_jira_time)
            .unwrap_or(created);
        let resolved = self
            .fields
            .resolutiondate
            .as_deref()
            .and_then(parse_jira_time);

        Some(WorkItem {
            id: self.id,
            key: self.key,
            item_type: self
                .fields
                .issuetype
                .map(|t| t.name)
                .unwrap_or_else(|| "Task".to_string()),
            status: self
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            assignee: self.fields.assignee.map(|a| a.display_name),
            created,
            updated,
            resolved,
            story_points: self.fields.story_points,
            components: self.fields.components.into_iter().map(|c| c.name).collect(),
            labels: self.fields.labels,
            project: self.fields.project.map(|p| p.key).unwrap_or_default(),
        })
    }
}

impl Changelog {
    /// Flatten histories into ordered transition events, dropping entries
    /// whose timestamps do not parse.
    pub fn into_transitions(self) -> Vec<TransitionEvent> {
        let mut events: Vec<TransitionEvent> = self
            .histories
            .into_iter()
            .filter_map(|history| {
                let at = parse_jira_time(&history.created)?;
                let actor = history.author.map(|a| a.display_name);
                Some(history.items.into_iter().map(move |item| TransitionEvent {
                    at,
                    actor: actor.clone(),
                    field: item.field,
                    from: item.from_string,
                    to: item.to_string,
                }))
            })
            .flatten()
            .collect();
        events.sort_by_key(|e| e.at);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_and_rfc3339_timestamps() {
        assert!(parse_jira_time("2026-03-01T10:30:00.000+0000").is_some());
        assert!(parse_jira_time("2026-03-01T10:30:00+00:00").is_some());
        assert!(parse_jira_time("yesterday").is_none());
    }

    #[test]
    fn changelog_flattens_and_sorts() {
        let log = Changelog {
            histories: vec![
                History {
                    created: "2026-03-02T10:00:00.000+0000".into(),
                    author: None,
                    items: vec![HistoryItem {
                        field: "status".into(),
                        from_string: Some("In Progress".into()),
                        to_string: Some("Done".into()),
                    }],
                },
                History {
                    created: "2026-03-01T10:00:00.000+0000".into(),
                    author: None,
                    items: vec![HistoryItem {
                        field: "status".into(),
                        from_string: Some("To Do".into()),
                        to_string: Some("In Progress".into()),
                    }],
                },
            ],
        };
        let events = log.into_transitions();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].to.as_deref(), Some("In Progress"));
        assert_eq!(events[1].to.as_deref(), Some("Done"));
    }
}
