//! Native messaging host manifests.
//!
//! The browser finds a host by reading `<name>.json` from a fixed set of
//! per-user and system directories. The manifest names the executable to
//! launch and the extensions allowed to talk to it.

use crate::error::{BridgeError, Result};
use crate::validation::{validate_host_name, validate_host_path, validate_host_type};
use directories::BaseDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostManifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
}

impl HostManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| BridgeError::InvalidManifest {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
    }

    /// Checks the manifest against the name it was looked up under.
    pub fn validate(&self, expected_name: &str, manifest_path: &Path) -> Result<()> {
        let invalid = |reason: String| BridgeError::InvalidManifest {
            path: manifest_path.to_path_buf(),
            reason,
        };

        if self.name != expected_name {
            return Err(invalid(format!(
                "name '{}' does not match '{expected_name}'",
                self.name
            )));
        }
        validate_host_type(&self.kind).map_err(|e| invalid(e.to_string()))?;
        validate_host_path(&self.path).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    pub fn allows_extension(&self, extension_id: &str) -> bool {
        self.allowed_extensions.iter().any(|id| id == extension_id)
    }
}

/// A manifest together with the file it was read from
#[derive(Debug, Clone)]
pub struct LocatedManifest {
    pub manifest: HostManifest,
    pub manifest_path: PathBuf,
}

/// Resolves host names to registered manifests
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    search_dirs: Vec<PathBuf>,
}

impl ManifestLocator {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Find and validate `<host_name>.json`. The first directory that has one wins.
    pub fn locate(&self, host_name: &str) -> Result<LocatedManifest> {
        let host_name = validate_host_name(host_name)?;
        let file_name = format!("{host_name}.json");

        for dir in &self.search_dirs {
            let candidate = dir.join(&file_name);
            if !candidate.is_file() {
                continue;
            }
            debug!("Found manifest for {host_name} at {}", candidate.display());
            let manifest = HostManifest::load(&candidate)?;
            manifest.validate(host_name, &candidate)?;
            return Ok(LocatedManifest {
                manifest,
                manifest_path: candidate,
            });
        }

        Err(BridgeError::HostNotRegistered {
            name: host_name.to_string(),
        })
    }
}

/// Platform manifest directories, per-user before system-wide.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if cfg!(target_os = "macos") {
        if let Some(base) = BaseDirs::new() {
            dirs.push(
                base.home_dir()
                    .join("Library/Application Support/Mozilla/NativeMessagingHosts"),
            );
        }
        dirs.push(PathBuf::from(
            "/Library/Application Support/Mozilla/NativeMessagingHosts",
        ));
    } else if cfg!(unix) {
        if let Some(base) = BaseDirs::new() {
            dirs.push(base.home_dir().join(".mozilla/native-messaging-hosts"));
        }
        dirs.push(PathBuf::from("/usr/lib/mozilla/native-messaging-hosts"));
        dirs.push(PathBuf::from("/usr/lib64/mozilla/native-messaging-hosts"));
    }

    dirs
}
