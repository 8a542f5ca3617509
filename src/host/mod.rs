//! Receiving end of the bridge: the native host process.
//!
//! Reads activity records from stdin, keeps the latest one on disk for the
//! activity logger and acknowledges each with `{"status":"ok"}`.

pub mod state;

pub use state::{is_firefox_app, BridgeSnapshot, StateStore};

use crate::error::{BridgeError, Result};
use crate::models::activity::url_domain;
use crate::native_messaging::{read_message, write_json};
use log::{debug, info, log_enabled, Level};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum HostResponse {
    #[serde(rename = "ok")]
    Acknowledged,
    #[serde(rename = "error")]
    Failed { details: String },
}

pub struct NativeHost<R, W> {
    reader: R,
    writer: W,
    store: StateStore,
}

impl<R: Read, W: Write> NativeHost<R, W> {
    pub fn new(reader: R, writer: W, store: StateStore) -> Self {
        Self {
            reader,
            writer,
            store,
        }
    }

    /// Serve until the browser closes the pipe.
    ///
    /// Returns `Ok(count)` of handled messages on a clean EOF. On any other
    /// failure an error response is written (best effort) and the error is
    /// returned.
    pub fn run(&mut self) -> Result<usize> {
        let mut handled = 0;
        loop {
            let result = match read_message(&mut self.reader) {
                Ok(Some(bytes)) => self.handle_message(&bytes),
                Ok(None) => {
                    info!("Browser closed the connection after {handled} messages");
                    return Ok(handled);
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    write_json(&mut self.writer, &HostResponse::Acknowledged)?;
                    handled += 1;
                }
                Err(e) => {
                    let response = HostResponse::Failed {
                        details: e.to_string(),
                    };
                    if let Err(write_err) = write_json(&mut self.writer, &response) {
                        debug!("Could not report error to browser: {write_err}");
                    }
                    return Err(e);
                }
            }
        }
    }

    fn handle_message(&self, bytes: &[u8]) -> Result<()> {
        let payload: Map<String, Value> = match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => map,
            other => {
                return Err(BridgeError::InvalidInput {
                    field: "message",
                    reason: format!("expected a JSON object, got {other}"),
                })
            }
        };

        if log_enabled!(Level::Debug) {
            let tab_id = payload.get("tabId").and_then(Value::as_i64);
            let domain = payload
                .get("url")
                .and_then(Value::as_str)
                .and_then(url_domain);
            debug!(
                "Activity in tab {} on {}",
                tab_id.map_or_else(|| "?".to_string(), |id| id.to_string()),
                domain.as_deref().unwrap_or("<no host>")
            );
        }
        self.store.persist(payload)
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
