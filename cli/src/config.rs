use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cfb::ContainerRuntime;

/// Persisted user preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Engine used for advice and suggested commands.
    pub runtime: ContainerRuntime,
}

/// `<config dir>/cfb/settings.toml`, when the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cfb").join("settings.toml"))
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read '{}'", path.display()));
            }
        };
        toml::from_str(&text).with_context(|| format!("invalid settings in '{}'", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create '{}'", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).context("cannot serialize settings")?;
        fs::write(path, text).with_context(|| format!("cannot write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), runtime = %self.runtime, "settings saved");
        Ok(())
    }
}
