use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tagview_types::Credentials;

use crate::api::DEFAULT_BASE_URL;
use crate::services::{AnchorStore, AuthProvider, SettingsProvider};

/// Environment variable overriding the configured board url
pub const SERVER_URL_ENV: &str = "TAGVIEW_SERVER_URL";

/// Board account used for favorites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: Option<String>,
    pub api_key: Option<String>,
}

impl Account {
    /// Credentials, when both halves are filled in
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(Credentials {
            username: username.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Client settings stored locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub proxy_url: Option<String>,
    /// Maximum number of posts kept in the window
    pub page_size: usize,
    /// Posts requested per page load
    pub fetch_limit: u32,
    /// Tag search the feed is built from
    pub tags: String,
    pub account: Account,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy_url: None,
            page_size: 300,
            fetch_limit: 75,
            tags: String::new(),
            account: Account::default(),
        }
    }
}

/// Shared, mutable settings. Readers always see the latest values, so page
/// size or credentials can change mid-session.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<ClientSettings>>,
}

impl SettingsHandle {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn snapshot(&self) -> ClientSettings {
        self.read().clone()
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ClientSettings),
    {
        let mut settings = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut settings);
        log::debug!("settings updated: page_size={}", settings.page_size);
    }

    fn read(&self) -> RwLockReadGuard<'_, ClientSettings> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsProvider for SettingsHandle {
    fn page_size(&self) -> usize {
        self.read().page_size
    }

    fn proxy_url(&self) -> Option<String> {
        self.read()
            .proxy_url
            .clone()
            .filter(|p| !p.trim().is_empty())
    }
}

impl AuthProvider for SettingsHandle {
    fn credentials(&self) -> Option<Credentials> {
        self.read().account.credentials()
    }
}

/// On-disk shape of the anchor file
#[derive(Debug, Default, Serialize, Deserialize)]
struct AnchorFile {
    first_post_id: Option<i64>,
}

/// Anchor persisted as a small JSON file
#[derive(Debug, Clone)]
pub struct FileAnchorStore {
    file_path: PathBuf,
}

impl FileAnchorStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl AnchorStore for FileAnchorStore {
    fn saved_first_post_id(&self) -> Result<Option<i64>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.file_path).context("Failed to read anchor file")?;

        match serde_json::from_str::<AnchorFile>(&json) {
            Ok(anchor) => Ok(anchor.first_post_id),
            Err(e) => {
                log::warn!("Anchor file is corrupted, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    fn save_first_post_id(&self, id: Option<i64>) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create anchor directory")?;
        }

        let json = serde_json::to_string(&AnchorFile { first_post_id: id })
            .context("Failed to serialize anchor")?;

        // Write to a temporary file, then rename over the old one
        let temp_path = self.file_path.with_extension("tmp");
        let mut file =
            fs::File::create(&temp_path).context("Failed to create temporary anchor file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write anchor")?;
        drop(file);

        fs::rename(&temp_path, &self.file_path).context("Failed to rename temporary anchor file")?;
        Ok(())
    }
}

/// Pick the board url: the environment wins over the settings file
pub fn resolve_base_url(configured: &str, env_override: Option<String>) -> String {
    env_override
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| configured.to_string())
}

/// Configuration manager for the .tagview directory
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at `~/.tagview`
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Self::with_dir(home_dir.join(".tagview"))
    }

    /// Create a config manager rooted at an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn get_settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    fn get_anchor_file(&self) -> PathBuf {
        self.config_dir.join("anchor.json")
    }

    /// Load settings, falling back to defaults when none are saved yet
    pub fn load_settings(&self) -> Result<ClientSettings> {
        let settings_file = self.get_settings_file();

        let mut settings = if settings_file.exists() {
            let json =
                fs::read_to_string(&settings_file).context("Failed to read settings file")?;
            serde_json::from_str(&json).context("Failed to parse settings")?
        } else {
            ClientSettings::default()
        };

        settings.base_url =
            resolve_base_url(&settings.base_url, std::env::var(SERVER_URL_ENV).ok());
        Ok(settings)
    }

    /// Save settings
    pub fn save_settings(&self, settings: &ClientSettings) -> Result<()> {
        let json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        fs::write(self.get_settings_file(), json).context("Failed to write settings file")?;

        log::info!("Saved settings to {}", self.config_dir.display());
        Ok(())
    }

    /// Anchor store living next to the settings file
    pub fn anchor_store(&self) -> FileAnchorStore {
        FileAnchorStore::new(self.get_anchor_file())
    }
}
