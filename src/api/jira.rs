use crate::errors::{Result, TaskDockError};
use crate::models::issue::{BoardConfiguration, Issue, IssuePage, Myself};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const MAX_RESULTS: u32 = 100;
const ISSUE_FIELDS: &str = "summary,status,priority,assignee,description";

/// Shared HTTP client; every request gets the same timeout.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("taskdock/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TaskDockError::Network(format!("Failed to set up HTTP client: {}", e)))
}

pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    pub fn new(client: Client, base_url: String, email: String, api_token: String) -> Self {
        Self {
            client,
            base_url,
            email,
            api_token,
        }
    }

    /// Identity of the credentials' owner.
    pub async fn myself(&self) -> Result<Myself> {
        let url = format!("{}/rest/api/3/myself", self.base_url);
        self.get_json(&url, &[]).await
    }

    /// Up to `MAX_RESULTS` issues of a board, optionally narrowed by JQL.
    pub async fn board_issues(&self, board_id: &str, jql: Option<&str>) -> Result<Vec<Issue>> {
        let url = format!(
            "{}/rest/agile/1.0/board/{}/issue",
            self.base_url,
            urlencoding::encode(board_id)
        );

        let mut query = vec![
            ("maxResults", MAX_RESULTS.to_string()),
            ("fields", ISSUE_FIELDS.to_string()),
        ];
        if let Some(jql) = jql {
            query.insert(0, ("jql", jql.to_string()));
        }

        let page: IssuePage = self.get_json(&url, &query).await?;
        Ok(page.issues)
    }

    pub async fn board_configuration(&self, board_id: &str) -> Result<BoardConfiguration> {
        let url = format!(
            "{}/rest/agile/1.0/board/{}/configuration",
            self.base_url,
            urlencoding::encode(board_id)
        );
        self.get_json(&url, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(url, error = %e, "Jira request failed");
                transport_error(&e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            warn!(url, status = status.as_u16(), body = %text, "Jira API error");
            return Err(TaskDockError::from_status(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(url, error = %e, body = %text, "Failed to parse Jira response");
            TaskDockError::InvalidResponse(e.to_string())
        })
    }
}

fn transport_error(err: &reqwest::Error) -> TaskDockError {
    if err.is_timeout() {
        TaskDockError::Network(format!(
            "Jira did not answer within {} seconds",
            REQUEST_TIMEOUT.as_secs()
        ))
    } else {
        TaskDockError::Network(format!("Failed to send request to Jira: {}", err))
    }
}
