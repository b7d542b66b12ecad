pub mod jira;
pub mod tasks;
