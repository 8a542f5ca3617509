use crate::constants::{
    EXTENSION_ID, HOST_NAME, STATE_APP_DIR, STATE_DIR_ENV, STATE_SUBDIR, STATE_FILE_NAME,
};
use crate::error::{BridgeError, Result};
use crate::manifest::default_search_dirs;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Settings for the browser side of the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub host_name: String,
    pub extension_id: String,
    pub manifest_dirs: Vec<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_name: HOST_NAME.to_string(),
            extension_id: EXTENSION_ID.to_string(),
            manifest_dirs: default_search_dirs(),
        }
    }
}

/// Settings for the native host process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub state_dir: PathBuf,
}

impl HostConfig {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// `$ACTIVITY_BRIDGE_STATE_DIR`, else `<data dir>/activity_logger/bridge`.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(STATE_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }
        Self::default_location()
    }

    pub fn default_location() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", STATE_APP_DIR).ok_or(BridgeError::NoProjectDirs)?;
        Ok(Self::new(proj_dirs.data_dir().join(STATE_SUBDIR)))
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE_NAME)
    }
}
