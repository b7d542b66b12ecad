use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum TaskDockError {
    // Configuration errors
    ConfigMissing,
    ConfigInvalid(String),
    Persistence(String),

    // Jira errors
    AuthFailed { status: u16, message: Option<String> },
    Api { status: u16, message: Option<String> },
    InvalidResponse(String),

    // Network errors
    Network(String),

    // Boundary errors
    InvalidUrl(String),
    Launch(String),
}

impl TaskDockError {
    /// Classifies a non-2xx Jira response, keeping the API's own message when the
    /// body carries one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = api_message(body);
        match status {
            401 | 403 => TaskDockError::AuthFailed { status, message },
            _ => TaskDockError::Api { status, message },
        }
    }

    /// Colored, multi-line rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.to_string().red().bold());
        let steps: &[&str] = match self {
            TaskDockError::ConfigMissing => &["Run 'taskdock login' to set your Jira credentials"],
            TaskDockError::ConfigInvalid(_) => &[
                "Check your config file: ~/.taskdock/config.toml",
                "Or log in again: taskdock login",
            ],
            TaskDockError::Persistence(_) => &[
                "Check that ~/.taskdock is writable",
                "Verify there is free disk space",
            ],
            TaskDockError::AuthFailed { .. } => &[
                "Generate new token: https://id.atlassian.com/manage-profile/security/api-tokens",
                "Update credentials: taskdock login",
            ],
            TaskDockError::Api { .. } => &[
                "Check the board id with: taskdock board",
                "Try again in a moment",
            ],
            TaskDockError::InvalidResponse(_) => &["Check the domain points at a Jira Cloud site"],
            TaskDockError::Network(_) => &[
                "Check your internet connection",
                "Verify the domain is reachable",
            ],
            TaskDockError::InvalidUrl(_) => &[],
            TaskDockError::Launch(_) => &["Copy the link and open it in your browser manually"],
        };

        if !steps.is_empty() {
            out.push_str("\n   To fix:\n");
            for (i, step) in steps.iter().enumerate() {
                out.push_str(&format!("   {}. {}\n", i + 1, step.dimmed()));
            }
        }
        out
    }
}

impl fmt::Display for TaskDockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskDockError::ConfigMissing => write!(f, "Configuration not set"),
            TaskDockError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            TaskDockError::Persistence(msg) => write!(f, "Could not store configuration: {}", msg),
            TaskDockError::AuthFailed { status, message } => match message {
                Some(msg) => write!(f, "{}", msg),
                None => write!(f, "Jira authentication failed ({})", status),
            },
            TaskDockError::Api { status, message } => match message {
                Some(msg) => write!(f, "{}", msg),
                None => write!(f, "Jira API error ({})", status),
            },
            TaskDockError::InvalidResponse(msg) => write!(f, "Unexpected response from Jira: {}", msg),
            TaskDockError::Network(msg) => write!(f, "{}", msg),
            TaskDockError::InvalidUrl(url) => write!(f, "Refusing to open non-web URL: {}", url),
            TaskDockError::Launch(msg) => write!(f, "Could not open browser: {}", msg),
        }
    }
}

impl std::error::Error for TaskDockError {}

/// Picks the human readable message out of a Jira error body:
/// `errorMessages[0]` first, then the first value of `errors`.
fn api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let from_list = value["errorMessages"]
        .as_array()
        .and_then(|messages| messages.iter().find_map(|m| m.as_str()))
        .filter(|m| !m.is_empty());

    let from_map = || {
        value["errors"]
            .as_object()
            .and_then(|errors| errors.values().find_map(|m| m.as_str()))
            .filter(|m| !m.is_empty())
    };

    from_list.or_else(from_map).map(str::to_string)
}

impl From<toml::ser::Error> for TaskDockError {
    fn from(err: toml::ser::Error) -> Self {
        TaskDockError::Persistence(err.to_string())
    }
}

impl From<::config::ConfigError> for TaskDockError {
    fn from(err: ::config::ConfigError) -> Self {
        TaskDockError::ConfigInvalid(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TaskDockError>;
