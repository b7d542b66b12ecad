use crate::api::tasks::{FetchScope, TaskFetcher};
use crate::config::settings::{ConfigStore, Configuration};
use crate::errors::{Result, TaskDockError};
use crate::models::issue::BoardConfiguration;
use crate::models::task::Task;
use reqwest::Url;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Result of a fetch as handed to the UI: `{"tasks": [...]}` or `{"error": "..."}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchOutcome {
    Tasks(Vec<Task>),
    Error(String),
}

/// Result of save/logout as handed to the UI.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<()>> for SaveOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Operations offered to the UI layer. Owns the configuration and the fetcher.
pub struct App {
    store: ConfigStore,
    fetcher: TaskFetcher,
}

impl App {
    pub fn new(store: ConfigStore, fetcher: TaskFetcher) -> Self {
        Self { store, fetcher }
    }

    /// Loads the saved configuration; `Some` tells the UI what to pre-fill.
    pub fn init(&mut self) -> Option<&Configuration> {
        if self.store.load() {
            Some(self.store.get())
        } else {
            None
        }
    }

    pub fn save_config(&mut self, config: Configuration) -> SaveOutcome {
        let result = self.store.save(config);
        if let Err(e) = &result {
            warn!(error = %e, "saving configuration failed");
        }
        result.into()
    }

    pub fn get_config(&self) -> &Configuration {
        self.store.get()
    }

    pub fn config_path(&self) -> &Path {
        self.store.path()
    }

    pub fn logout(&mut self) -> SaveOutcome {
        let result = self.store.clear();
        match &result {
            Ok(()) => info!("logged out"),
            Err(e) => warn!(error = %e, "removing configuration failed"),
        }
        result.into()
    }

    pub async fn fetch_tasks(&self, scope: FetchScope) -> FetchOutcome {
        match self.fetcher.fetch_tasks(self.store.get(), scope).await {
            Ok(tasks) => FetchOutcome::Tasks(tasks),
            Err(e) => {
                warn!(error = ?e, "fetching tasks failed");
                FetchOutcome::Error(e.to_string())
            }
        }
    }

    pub async fn board_summary(&self) -> Result<BoardConfiguration> {
        self.fetcher.board_summary(self.store.get()).await
    }

    /// Checks candidate credentials before they are saved.
    pub async fn verify(&self, config: &Configuration) -> Result<BoardConfiguration> {
        self.fetcher.board_summary(config).await
    }

    pub fn open_external(&self, url: &str) -> Result<()> {
        let url = web_url(url)?;
        open::that(url.as_str())
            .map_err(|e| TaskDockError::Launch(format!("{}: {}", url, e)))
    }
}

/// Only `http`/`https` links leave the app.
pub fn web_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|_| TaskDockError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(TaskDockError::InvalidUrl(raw.to_string())),
    }
}
