use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::loader::{ScriptManifest, DEFAULT_BASE_PATH, DEFAULT_SCRIPTS};
use crate::toolkit::CropRatio;
use crate::ui::{ChromeOverrides, ChromeTokens, CHROME_TOKENS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

const APP_DIR: &str = "editpop";
const APP_CONFIG_FILE: &str = "config.json";

/// Popup settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PopupConfig {
    #[serde(default)]
    pub script_base_path: Option<String>,
    #[serde(default)]
    pub scripts: Option<Vec<String>>,
    /// Width/height ratio crops must keep; absent or non-positive means free.
    #[serde(default)]
    pub crop_ratio: Option<f64>,
    #[serde(default)]
    pub screen_height_ratio: Option<f64>,
    #[serde(default)]
    pub chrome: ChromeOverrides,
}

impl PopupConfig {
    pub fn manifest(&self) -> ScriptManifest {
        let base = self
            .script_base_path
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());
        let scripts = self
            .scripts
            .clone()
            .unwrap_or_else(|| DEFAULT_SCRIPTS.iter().map(|s| s.to_string()).collect());
        ScriptManifest::new(base, scripts)
    }

    pub fn crop_ratio(&self) -> Option<CropRatio> {
        self.crop_ratio.and_then(CropRatio::new)
    }

    pub fn chrome_tokens(&self) -> ChromeTokens {
        let mut tokens = CHROME_TOKENS.merged_with(&self.chrome);
        if let Some(ratio) = self
            .screen_height_ratio
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0 && *ratio <= 1.0)
        {
            tokens.screen_height_ratio = ratio;
        }
        tokens
    }
}

pub fn load_popup_config() -> PopupConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_popup_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_popup_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> PopupConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return PopupConfig::default(),
    };
    if !path.exists() {
        return PopupConfig::default();
    }
    read_popup_config(&path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "invalid config.json; using defaults");
        PopupConfig::default()
    })
}

pub fn read_popup_config(path: &Path) -> ConfigResult<PopupConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
