use std::path::PathBuf;
use thiserror::Error;

/// Bridge error type
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Native host '{name}' is not registered")]
    HostNotRegistered { name: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Failed to launch native host {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Native port is disconnected")]
    Disconnected,

    #[error("Message too large: {len} bytes (max: {max} bytes)")]
    MessageTooLarge { len: usize, max: usize },

    #[error("Tab query failed: {0}")]
    HostQuery(String),

    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// True when the error means the channel could not be opened at all
    pub fn is_establishment_failure(&self) -> bool {
        matches!(
            self,
            BridgeError::HostNotRegistered { .. }
                | BridgeError::InvalidInput { .. }
                | BridgeError::InvalidManifest { .. }
                | BridgeError::Spawn { .. }
        )
    }

    /// True for the EOF the host sees when the browser closes the pipe mid-frame
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, BridgeError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
