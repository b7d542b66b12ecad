use crate::errors::{Result, TaskDockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".taskdock";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "TASKDOCK";

/// Jira credentials plus the board to watch.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    /// Bare hostname, e.g. `acme.atlassian.net`.
    pub domain: String,
    pub email: String,
    pub api_token: String,
    pub board_id: String,
}

impl Configuration {
    pub fn new(
        domain: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
        board_id: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            email: email.into(),
            api_token: api_token.into(),
            board_id: board_id.into(),
        }
        .normalized()
    }

    /// Trims every field and reduces `domain` to a bare host.
    pub fn normalized(self) -> Self {
        let domain = self.domain.trim();
        let domain = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .unwrap_or(domain)
            .trim_end_matches('/');

        Self {
            domain: domain.to_string(),
            email: self.email.trim().to_string(),
            api_token: self.api_token.trim().to_string(),
            board_id: self.board_id.trim().to_string(),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("domain", &self.domain),
            ("email", &self.email),
            ("api_token", &self.api_token),
            ("board_id", &self.board_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn masked_token(&self) -> String {
        mask(&self.api_token)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("domain", &self.domain)
            .field("email", &self.email)
            .field("api_token", &self.masked_token())
            .field("board_id", &self.board_id)
            .finish()
    }
}

fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Owns the active configuration and its file on disk. All mutation goes
/// through `&mut self`, so the UI side is the single writer.
pub struct ConfigStore {
    path: PathBuf,
    env_prefix: Option<String>,
    active: Configuration,
}

impl ConfigStore {
    /// Store backed by `~/.taskdock/config.toml`, with `TASKDOCK_*` overrides.
    pub fn open() -> Result<Self> {
        Ok(Self::at(Self::default_path()?).with_env_prefix(ENV_PREFIX))
    }

    /// Store backed by `path` alone; the environment is not consulted.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_prefix: None,
            active: Configuration::default(),
        }
    }

    /// Lets `{prefix}_DOMAIN`, `{prefix}_API_TOKEN`, ... override a present file.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .ok_or_else(|| TaskDockError::ConfigInvalid("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file into the active configuration. Returns `false` when the
    /// file is absent or unreadable; the active configuration is then empty.
    pub fn load(&mut self) -> bool {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved configuration");
            self.active = Configuration::default();
            return false;
        }

        match read_file(&self.path, self.env_prefix.as_deref()) {
            Ok(config) => {
                debug!(?config, "configuration loaded");
                self.active = config.normalized();
                true
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable configuration");
                self.active = Configuration::default();
                false
            }
        }
    }

    pub fn get(&self) -> &Configuration {
        &self.active
    }

    /// Replaces the configuration wholesale. The active configuration only
    /// changes once the file has been written.
    pub fn save(&mut self, config: Configuration) -> Result<()> {
        let config = config.normalized();
        let contents = toml::to_string_pretty(&config)?;

        write_private(&self.path, &contents)?;
        self.active = config;

        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Forgets the credentials. Memory is reset even if the file cannot be removed.
    pub fn clear(&mut self) -> Result<()> {
        self.active = Configuration::default();

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "configuration removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaskDockError::Persistence(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

fn read_file(path: &Path, env_prefix: Option<&str>) -> Result<Configuration> {
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from(path).format(::config::FileFormat::Toml));
    if let Some(prefix) = env_prefix {
        builder = builder.add_source(::config::Environment::with_prefix(prefix));
    }

    Ok(builder.build()?.try_deserialize::<Configuration>()?)
}

/// Writes a uniquely named sibling temp file (created 0600 on unix) and
/// renames it over `path`.
fn write_private(path: &Path, contents: &str) -> Result<()> {
    let failed = |action: &str, target: &Path, e: std::io::Error| {
        TaskDockError::Persistence(format!("failed to {} {}: {}", action, target.display(), e))
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| failed("create", dir, e))?;

    let mut tmp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| failed("create temp file in", dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| failed("write", tmp.path(), e))?;

    tmp.persist(path).map_err(|e| failed("replace", path, e.error))?;
    Ok(())
}
