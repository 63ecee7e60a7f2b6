use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::insight::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};

pub const DATA_DIR_ENV: &str = "PRADAKSHINA_DATA_DIR";
pub const MODEL_ENV: &str = "PRADAKSHINA_MODEL";
const API_KEY_ENVS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightSettings {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.into(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareSettings {
    pub base_url: String,
    pub title: String,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            base_url: "https://pradakshina.app/".into(),
            title: "Pradakshina Path".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    insight: InsightSettings,
    share: ShareSettings,
}

/// `settings.json` in the data directory.
///
/// A missing file is written out with defaults so it can be edited by hand;
/// an unreadable one is ignored in favour of defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: UserSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            let data = UserSettings::default();
            persist(&path, &data)?;
            data
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insight settings with `PRADAKSHINA_MODEL` applied on top.
    pub fn insight(&self) -> InsightSettings {
        let mut settings = self.data.insight.clone();
        if let Some(model) = non_blank_env(MODEL_ENV) {
            settings.model = model;
        }
        settings
    }

    pub fn share(&self) -> ShareSettings {
        self.data.share.clone()
    }
}

fn persist(path: &Path, data: &UserSettings) -> Result<()> {
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}

/// The text-generation credential, if one is configured.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENVS.iter().find_map(|name| non_blank_env(name))
}

/// `--data-dir`, then `PRADAKSHINA_DATA_DIR`, then the platform data dir.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = non_blank_env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("pradakshina"))
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
