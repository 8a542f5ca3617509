//! Shared test doubles for the bridge.
//!
//! `FakeConnector` stands in for the native host, `FakeTabSource` for the
//! browser's tab API.

#![cfg(test)]

use crate::connection::{Connector, DisconnectNotifier, NativePort};
use crate::error::{BridgeError, Result};
use crate::events::{TabQuery, TabSource, WindowScope};
use crate::models::TabSnapshot;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ConnectorState {
    attempts: AtomicUsize,
    refuse: AtomicBool,
    fail_sends: AtomicBool,
    disconnect_immediately: AtomicBool,
    host_names: Mutex<Vec<String>>,
    sent: Mutex<Vec<Vec<u8>>>,
    notifiers: Mutex<Vec<DisconnectNotifier>>,
}

/// Scripted connector that records every message written to its ports.
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<ConnectorState>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    pub fn host_names(&self) -> Vec<String> {
        self.state.host_names.lock().unwrap().clone()
    }

    pub fn set_refuse(&self, refuse: bool) {
        self.state.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.state.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn set_disconnect_immediately(&self, disconnect: bool) {
        self.state.disconnect_immediately.store(disconnect, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.sent.lock().unwrap().clone()
    }

    pub fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).unwrap())
            .collect()
    }

    pub fn take_notifiers(&self) -> Vec<DisconnectNotifier> {
        std::mem::take(&mut *self.state.notifiers.lock().unwrap())
    }

    /// Simulate the host process exiting.
    pub fn disconnect_all(&self) {
        for notifier in self.take_notifiers() {
            notifier.notify();
        }
    }
}

impl Connector for FakeConnector {
    fn connect(
        &self,
        host_name: &str,
        on_disconnect: DisconnectNotifier,
    ) -> Result<Box<dyn NativePort>> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        self.state
            .host_names
            .lock()
            .unwrap()
            .push(host_name.to_string());

        if self.state.refuse.load(Ordering::SeqCst) {
            return Err(BridgeError::HostNotRegistered {
                name: host_name.to_string(),
            });
        }
        if self.state.disconnect_immediately.load(Ordering::SeqCst) {
            on_disconnect.notify();
        } else {
            self.state.notifiers.lock().unwrap().push(on_disconnect);
        }
        Ok(Box::new(RecordingPort {
            state: Arc::clone(&self.state),
        }))
    }
}

struct RecordingPort {
    state: Arc<ConnectorState>,
}

impl NativePort for RecordingPort {
    fn post_message(&self, payload: &[u8]) -> Result<()> {
        if self.state.fail_sends.load(Ordering::SeqCst) {
            return Err(BridgeError::Io(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )));
        }
        self.state.sent.lock().unwrap().push(payload.to_vec());
        Ok(())
    }
}

/// In-memory browser with a fixed set of tabs.
#[derive(Default)]
pub struct FakeTabSource {
    pub tabs: Vec<TabSnapshot>,
    pub current_window: i64,
    pub fail_queries: bool,
    pub queries: Mutex<Vec<TabQuery>>,
}

impl FakeTabSource {
    pub fn with_tabs(tabs: Vec<TabSnapshot>) -> Self {
        Self {
            tabs,
            current_window: 1,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    pub fn recorded_queries(&self) -> Vec<TabQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl TabSource for FakeTabSource {
    fn get_tab(&self, tab_id: i64) -> Result<TabSnapshot> {
        if self.fail_queries {
            return Err(BridgeError::HostQuery(format!("no tab with id {tab_id}")));
        }
        self.tabs
            .iter()
            .find(|t| t.tab_id == tab_id)
            .cloned()
            .ok_or_else(|| BridgeError::HostQuery(format!("no tab with id {tab_id}")))
    }

    fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabSnapshot>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail_queries {
            return Err(BridgeError::HostQuery("query failed".into()));
        }
        let window_id = match query.window {
            WindowScope::Current => self.current_window,
            WindowScope::Id(id) => id,
        };
        Ok(self
            .tabs
            .iter()
            .filter(|t| t.window_id == window_id && (!query.active_only || t.active))
            .cloned()
            .collect())
    }
}
