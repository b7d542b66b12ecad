use serde::Deserialize;

/// `GET /rest/api/3/myself`, only the part we use.
#[derive(Debug, Deserialize)]
pub struct Myself {
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// One page of `GET /rest/agile/1.0/board/{id}/issue`.
#[derive(Debug, Deserialize)]
pub struct IssuePage {
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: Named,
    #[serde(default)]
    pub priority: Option<Named>,
    #[serde(default)]
    pub assignee: Option<User>,
    /// Plain text on agile endpoints, an ADF document on platform v3 ones.
    #[serde(default)]
    pub description: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct User {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// `GET /rest/agile/1.0/board/{id}/configuration`
#[derive(Debug, Deserialize)]
pub struct BoardConfiguration {
    pub id: u64,
    pub name: String,
    #[serde(rename = "columnConfig", default)]
    pub column_config: ColumnConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ColumnConfig {
    #[serde(default)]
    pub columns: Vec<Named>,
}
