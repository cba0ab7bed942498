use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::host::DEFAULT_HOST_MESSAGE_TAG;

pub const CONFIG_FILENAME: &str = "quickmark.json";
pub const CONFIG_VERSION: &str = "1.0.0";
pub const CONFIG_DIR_NAME: &str = "quickmark";

/// Folder that receives new folders and bookmarks when nothing else is chosen.
/// In Chromium this is the bookmarks bar.
pub const DEFAULT_ROOT_FOLDER_ID: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickmarkConfig {
    pub version: String,
    pub root_folder_id: String,
    pub listen_addr: SocketAddr,
    pub bridge_timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks_file: Option<PathBuf>,
    pub blur_select_delay_ms: u64,
    pub host_message_tag: String,
}

impl Default for QuickmarkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            root_folder_id: DEFAULT_ROOT_FOLDER_ID.to_string(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 4850)),
            bridge_timeout_ms: 10_000,
            bookmarks_file: None,
            blur_select_delay_ms: 200,
            host_message_tag: DEFAULT_HOST_MESSAGE_TAG.to_string(),
        }
    }
}

impl QuickmarkConfig {
    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_timeout_ms)
    }

    pub fn blur_select_delay(&self) -> Duration {
        Duration::from_millis(self.blur_select_delay_ms)
    }
}

/// Platform config directory, e.g. `~/.config/quickmark` on Linux.
pub fn default_config_dir() -> CoreResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| {
            CoreError::Internal("cannot determine the user config directory".to_string())
        })
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

pub fn load_or_create_config(dir: &Path) -> CoreResult<QuickmarkConfig> {
    std::fs::create_dir_all(dir).map_err(|error| {
        CoreError::Internal(format!(
            "failed to create config directory {}: {error}",
            dir.display()
        ))
    })?;

    let path = config_path(dir);
    if !path.exists() {
        let config = QuickmarkConfig::default();
        write_config(&path, &config)?;
        return Ok(config);
    }

    let data = std::fs::read_to_string(&path).map_err(|error| {
        CoreError::Internal(format!("failed to read config {}: {error}", path.display()))
    })?;
    let config: QuickmarkConfig = serde_json::from_str(&data).map_err(|error| {
        CoreError::Internal(format!("failed to parse config {}: {error}", path.display()))
    })?;

    if config.version != CONFIG_VERSION {
        return Err(CoreError::Internal(format!(
            "unsupported config version {} in {}",
            config.version,
            path.display()
        )));
    }

    Ok(config)
}

pub fn write_config(path: &Path, config: &QuickmarkConfig) -> CoreResult<()> {
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        CoreError::Internal(format!(
            "failed to serialize config {}: {error}",
            path.display()
        ))
    })?;
    std::fs::write(path, data).map_err(|error| {
        CoreError::Internal(format!("failed to write config {}: {error}", path.display()))
    })?;
    Ok(())
}
