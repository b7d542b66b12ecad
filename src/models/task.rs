use crate::models::issue::Issue;
use serde::Serialize;
use serde_json::Value;

pub const NO_PRIORITY: &str = "None";
pub const UNASSIGNED: &str = "Unassigned";
pub const NO_DESCRIPTION: &str = "No description";

/// A board issue, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub key: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub description: String,
    pub url: String,
}

impl Task {
    pub fn from_issue(issue: Issue, domain: &str) -> Self {
        let fields = issue.fields;
        let url = browse_url(domain, &issue.key);

        Self {
            key: issue.key,
            title: fields.summary,
            status: fields.status.name,
            priority: fields
                .priority
                .map(|p| p.name)
                .unwrap_or_else(|| NO_PRIORITY.to_string()),
            assignee: fields
                .assignee
                .map(|a| a.display_name)
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            description: fields
                .description
                .as_ref()
                .map(description_text)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            url,
        }
    }
}

/// Web page of an issue. The key is a single path segment.
pub fn browse_url(domain: &str, key: &str) -> String {
    format!("https://{}/browse/{}", domain, urlencoding::encode(key))
}

fn description_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Object(_) => {
            let mut out = String::new();
            flatten_adf(value, &mut out);
            out.trim().to_string()
        }
        _ => String::new(),
    }
}

/// Walks an Atlassian Document Format tree collecting its text.
fn flatten_adf(node: &Value, out: &mut String) {
    match node["type"].as_str() {
        Some("text") => {
            if let Some(text) = node["text"].as_str() {
                out.push_str(text);
            }
            return;
        }
        Some("hardBreak") => {
            out.push('\n');
            return;
        }
        _ => {}
    }

    if let Some(children) = node["content"].as_array() {
        for child in children {
            flatten_adf(child, out);
        }
    }

    let is_block = matches!(
        node["type"].as_str(),
        Some("paragraph" | "heading" | "codeBlock" | "blockquote" | "listItem" | "rule")
    );
    if is_block && !out.ends_with('\n') {
        out.push('\n');
    }
}
