//! Forwards the active browser tab to a local activity logger.
//!
//! The browser side ([`events`], [`transmitter`], [`connection`]) turns tab
//! and window notifications into [`models::ActivityRecord`]s and writes them
//! to a native messaging host. The host side ([`host`]) is that process: it
//! keeps the latest record on disk for the logger to pick up.

pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod events;
pub mod filter;
pub mod host;
pub mod manifest;
pub mod models;
pub mod native_messaging;
#[cfg(test)]
mod test_utils;
pub mod transmitter;
pub mod validation;

pub use config::{BridgeConfig, HostConfig};
pub use connection::{ConnectionHandle, ConnectionManager, ConnectionState, Connector, NativePort};
pub use error::{BridgeError, Result};
pub use events::{ActivityBridge, BrowserEvent, TabQuery, TabSource, WindowScope};
pub use filter::is_eligible;
pub use models::{ActivityRecord, TabChangeInfo, TabSnapshot, TabStatus};
pub use transmitter::{TransmitOutcome, Transmitter};
