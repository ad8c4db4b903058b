//! Application settings: where the data lives and what the printed bill is headed with.

use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

pub const DEFAULT_DATA_ROOT: &str = "~/Documents/Guesthouse";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub data_root: String,
    #[serde(default = "default_business_name")]
    pub business_name: String,
}

fn default_business_name() -> String {
    "Guesthouse".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_root: DEFAULT_DATA_ROOT.to_string(),
            business_name: default_business_name(),
        }
    }
}

impl AppSettings {
    /// `data_root` with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.data_root))
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "guesthouse-bill", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings() -> Option<AppSettings> {
    load_settings_from(&get_config_path())
}

pub fn load_settings_from(path: &Path) -> Option<AppSettings> {
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_settings(settings: &AppSettings) -> Result<PathBuf> {
    let path = get_config_path();
    save_settings_to(&path, settings)?;
    Ok(path)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<()> {
    let toml_str = toml::to_string_pretty(settings)?;
    fs::write(path, toml_str)?;
    Ok(())
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
