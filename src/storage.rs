use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::constants::{APP_DIR, CONFIG_FILE, HISTORY_FILE, LOG_FILE};
use crate::model::{RecencyList, Settings, SettingsFile};

#[cfg(test)]
use std::sync::Mutex;

pub(crate) fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("locate home directory")?;
    Ok(home.join(APP_DIR))
}

pub(crate) fn history_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(HISTORY_FILE))
}

pub(crate) fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(CONFIG_FILE))
}

pub(crate) fn log_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(LOG_FILE))
}

/// Reads the optional settings file; a missing file yields defaults.
pub(crate) fn load_settings_file(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse config file {}", path.display()))
}

/// Flags win over the file; a non-empty `history_disabled_env` turns recording off.
pub(crate) fn resolve_settings(
    file: SettingsFile,
    profile: Option<String>,
    region: Option<String>,
    debug: bool,
    history_disabled_env: Option<String>,
) -> Settings {
    let env_disabled = history_disabled_env.is_some_and(|value| !value.is_empty());
    Settings {
        profile: profile.or(file.profile).filter(|value| !value.is_empty()),
        region: region.or(file.region).filter(|value| !value.is_empty()),
        debug,
        record_history: file.history.unwrap_or(true) && !env_disabled,
        poll: file.poll.policy(),
    }
}

/// Where recently used instances are remembered.
pub(crate) trait RecencyStore {
    /// Never fails; unreadable state loads as an empty list.
    fn load(&self) -> RecencyList;
    fn record(&self, instance_id: &str, name: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub(crate) struct FileRecencyStore {
    path: Option<PathBuf>,
    enabled: bool,
}

impl FileRecencyStore {
    pub(crate) fn new(path: Option<PathBuf>, enabled: bool) -> Self {
        Self { path, enabled }
    }
}

impl RecencyStore for FileRecencyStore {
    fn load(&self) -> RecencyList {
        let Some(path) = &self.path else {
            return RecencyList::default();
        };
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn record(&self, instance_id: &str, name: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let Some(path) = &self.path else {
            anyhow::bail!("no location for history file");
        };
        let mut list = self.load();
        list.touch(instance_id, name, chrono::Utc::now());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create history dir")?;
        }
        let content = serde_json::to_string_pretty(&list).context("serialize history")?;
        fs::write(path, content).context("write history file")?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryRecencyStore {
    list: Mutex<RecencyList>,
}

#[cfg(test)]
impl MemoryRecencyStore {
    pub(crate) fn with_ids(ids: &[&str]) -> Self {
        let store = Self::default();
        for id in ids.iter().rev() {
            store
                .list
                .lock()
                .unwrap()
                .touch(id, "", chrono::Utc::now());
        }
        store
    }
}

#[cfg(test)]
impl RecencyStore for MemoryRecencyStore {
    fn load(&self) -> RecencyList {
        self.list.lock().unwrap().clone()
    }

    fn record(&self, instance_id: &str, name: &str) -> Result<()> {
        self.list
            .lock()
            .unwrap()
            .touch(instance_id, name, chrono::Utc::now());
        Ok(())
    }
}
