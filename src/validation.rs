use crate::error::BridgeError;
use std::path::Path;

/// Longest host name accepted (the browser has no limit; this keeps file names sane)
const MAX_HOST_NAME_LEN: usize = 255;

/// Validate a native host name: dot-separated runs of `[A-Za-z0-9_]`.
pub fn validate_host_name(name: &str) -> Result<&str, BridgeError> {
    let err = |reason: String| BridgeError::InvalidInput {
        field: "host_name",
        reason,
    };

    if name.is_empty() {
        return Err(err("cannot be empty".into()));
    }
    if name.len() > MAX_HOST_NAME_LEN {
        return Err(err(format!("cannot exceed {MAX_HOST_NAME_LEN} characters")));
    }
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err(err(format!("'{name}' has an empty segment")));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(err(format!("'{name}' contains invalid character '{c}'")));
        }
    }
    Ok(name)
}

/// Validate the `type` field of a host manifest. Only stdio hosts exist.
pub fn validate_host_type(kind: &str) -> Result<(), BridgeError> {
    if kind != "stdio" {
        return Err(BridgeError::InvalidInput {
            field: "type",
            reason: format!("expected 'stdio', got '{kind}'"),
        });
    }
    Ok(())
}

/// Validate the executable path of a host manifest.
pub fn validate_host_path(path: &Path) -> Result<(), BridgeError> {
    if path.as_os_str().is_empty() {
        return Err(BridgeError::InvalidInput {
            field: "path",
            reason: "cannot be empty".into(),
        });
    }
    if !path.is_absolute() {
        return Err(BridgeError::InvalidInput {
            field: "path",
            reason: format!("'{}' must be absolute", path.display()),
        });
    }
    Ok(())
}
