//! Latest-record state file shared with the activity logger.

use crate::config::HostConfig;
use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use log::debug;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What a consumer reads back from the state file. Every field is optional
/// because the file holds whatever the extension last sent; a field of the
/// wrong type reads as absent without discarding the rest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeSnapshot {
    pub url: Option<String>,
    pub title: Option<String>,
    pub tab_id: Option<i64>,
    pub window_id: Option<i64>,
    pub timestamp: Option<String>,
    pub received_at: Option<String>,
}

impl BridgeSnapshot {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(ToString::to_string);
        let int = |key: &str| map.get(key).and_then(Value::as_i64);
        Self {
            url: text("url"),
            title: text("title"),
            tab_id: int("tabId"),
            window_id: int("windowId"),
            timestamp: text("timestamp"),
            received_at: text("received_at"),
        }
    }
}

pub struct StateStore {
    dir: PathBuf,
    file: PathBuf,
}

impl StateStore {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            dir: config.state_dir.clone(),
            file: config.state_file(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Replace the state file with `payload` plus a `received_at` stamp.
    ///
    /// Written to a temp file in the same directory, synced, then renamed, so
    /// readers see either the old record or the new one.
    pub fn persist(&self, mut payload: Map<String, Value>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        payload.insert(
            "received_at".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, &payload)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file).map_err(|e| e.error)?;

        debug!("Persisted state to {}", self.file.display());
        Ok(())
    }

    /// Read the last record. Missing, unreadable or malformed files read as `None`.
    pub fn load(&self) -> Option<BridgeSnapshot> {
        let raw = match std::fs::read_to_string(&self.file) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No bridge state at {}: {e}", self.file.display());
                return None;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Some(BridgeSnapshot::from_map(&map)),
            Ok(other) => {
                debug!("Ignoring bridge state that is not an object: {other}");
                None
            }
            Err(e) => {
                debug!("Ignoring malformed bridge state: {e}");
                None
            }
        }
    }
}

/// Whether a focused application name belongs to Firefox, the only browser
/// whose bridge snapshot should be trusted.
pub fn is_firefox_app(app_name: &str) -> bool {
    app_name
        .trim()
        .to_lowercase()
        .replace(' ', "")
        .starts_with("firefox")
}
