use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{PulseError, Result};
use crate::responses::{Changelog, IssueNode, SearchResponse};
use crate::source::IssueSource;
use crate::types::{TransitionEvent, WorkItem};

const PAGE_SIZE: u32 = 100;
const MAX_PAGES: u32 = 20;

const HISTORY_FIELDS: &str =
    "issuetype,status,assignee,created,updated,resolutiondate,components,labels,project,customfield_10016";

pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    token: String,
}

impl JiraClient {
    pub fn new(base_url: String, email: String, token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            token,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PulseError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        Ok(response.json().await?)
    }

    /// Runs a JQL search, following pages until the result set is exhausted.
    async fn search(&self, jql: &str) -> Result<Vec<WorkItem>> {
        let mut items = Vec::new();
        let mut start_at = 0u32;

        for _ in 0..MAX_PAGES {
            let page: SearchResponse = self
                .get(
                    "/rest/api/2/search",
                    &[
                        ("jql", jql.to_string()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", PAGE_SIZE.to_string()),
                        ("fields", HISTORY_FIELDS.to_string()),
                    ],
                )
                .await?;

            let fetched = page.issues.len() as u32;
            items.extend(page.issues.into_iter().filter_map(IssueNode::into_work_item));

            start_at += fetched;
            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(items)
    }
}

#[derive(serde::Deserialize)]
struct IssueWithChangelog {
    changelog: Option<Changelog>,
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn fetch_items(&self, subject: &str, since_days: i64) -> Result<Vec<WorkItem>> {
        let jql = format!(
            "assignee = \"{subject}\" AND updated >= -{since_days}d ORDER BY created ASC"
        );
        self.search(&jql).await
    }

    async fn fetch_active_items(&self, subject: &str) -> Result<Vec<WorkItem>> {
        let jql = format!(
            "assignee = \"{subject}\" AND resolution = EMPTY AND statusCategory != Done ORDER BY created ASC"
        );
        self.search(&jql).await
    }

    async fn fetch_transitions(&self, item_id: &str) -> Result<Vec<TransitionEvent>> {
        let issue: IssueWithChangelog = self
            .get(
                &format!("/rest/api/2/issue/{item_id}"),
                &[
                    ("expand", "changelog".to_string()),
                    ("fields", "created".to_string()),
                ],
            )
            .await?;

        Ok(issue
            .changelog
            .map(Changelog::into_transitions)
            .unwrap_or_default())
    }

    async fn fetch_team_items(
        &self,
        projects: &[String],
        since_days: i64,
    ) -> Result<Vec<WorkItem>> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }
        let list = projects
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let jql = format!(
            "project in ({list}) AND resolved >= -{since_days}d ORDER BY resolved DESC"
        );
        self.search(&jql).await
    }
}
