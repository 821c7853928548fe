use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

pub const BACKEND_URL_KEY: &str = "ytBackendUrl";
pub const BACKEND_API_KEY_KEY: &str = "ytBackendKey";

/// Overrides the location of the settings file.
pub const CONFIG_PATH_ENV: &str = "YTDL_REMOTE_CONFIG";

const APP_DIR: &str = "ytdl-remote-gui";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }

    pub fn trimmed(&self) -> Self {
        Self {
            base_url: self.base_url.trim().to_string(),
            api_key: self.api_key.trim().to_string(),
        }
    }

    /// `<base><path>` with exactly one slash between the two.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.trim().trim_end_matches('/');
        if path.starts_with('/') {
            Url::parse(&format!("{base}{path}"))
        } else {
            Url::parse(&format!("{base}/{path}"))
        }
    }

    /// Resolves a `downloadUrl` returned by the backend.
    pub fn resolve_download_url(&self, download_url: &str) -> Result<Url, url::ParseError> {
        let lower = download_url.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Url::parse(download_url)
        } else {
            self.endpoint(download_url)
        }
    }
}

pub trait ConfigStore: Send + Sync {
    fn read(&self) -> BackendConfig;
    fn write(&self, config: &BackendConfig) -> Result<()>;
}

/// Settings kept as a flat JSON object of strings in the user's config dir.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env_or_default() -> Self {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(Self::default_path()),
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&raw) {
            Ok(values) => values
                .into_iter()
                .filter_map(|(key, value)| match value {
                    serde_json::Value::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect(),
            Err(e) => {
                log::warn!("Ignoring unreadable settings file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn read(&self) -> BackendConfig {
        let mut entries = self.load_entries();
        BackendConfig {
            base_url: entries.remove(BACKEND_URL_KEY).unwrap_or_default(),
            api_key: entries.remove(BACKEND_API_KEY_KEY).unwrap_or_default(),
        }
    }

    fn write(&self, config: &BackendConfig) -> Result<()> {
        let mut entries = self.load_entries();
        entries.insert(BACKEND_URL_KEY.to_string(), config.base_url.clone());
        entries.insert(BACKEND_API_KEY_KEY.to_string(), config.api_key.clone());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        log::info!("Saved backend settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
pub struct MemoryConfigStore {
    config: std::sync::Mutex<BackendConfig>,
}

#[cfg(test)]
impl MemoryConfigStore {
    pub fn new(config: BackendConfig) -> Self {
        Self { config: std::sync::Mutex::new(config) }
    }
}

#[cfg(test)]
impl ConfigStore for MemoryConfigStore {
    fn read(&self) -> BackendConfig {
        self.config.lock().unwrap().clone()
    }

    fn write(&self, config: &BackendConfig) -> Result<()> {
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }
}
