//! Browser event wiring.
//!
//! Each browser trigger results in at most one transmit. A failure to read
//! tab state is logged and the trigger is dropped; it never reaches the
//! transmitter.

use crate::config::BridgeConfig;
use crate::connection::{ConnectionManager, ProcessConnector};
use crate::constants::WINDOW_ID_NONE;
use crate::error::Result;
use crate::manifest::ManifestLocator;
use crate::models::{TabChangeInfo, TabSnapshot};
use crate::transmitter::{TransmitOutcome, Transmitter};
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// Which window a tab query is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowScope {
    /// The window the query is issued from
    Current,
    Id(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabQuery {
    pub active_only: bool,
    pub window: WindowScope,
}

impl TabQuery {
    pub fn active_in(window: WindowScope) -> Self {
        Self {
            active_only: true,
            window,
        }
    }
}

/// The browser's tab API, as far as the bridge needs it
pub trait TabSource {
    fn get_tab(&self, tab_id: i64) -> Result<TabSnapshot>;
    fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabSnapshot>>;
}

/// Browser notifications the bridge subscribes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrowserEvent {
    TabActivated {
        #[serde(rename = "tabId")]
        tab_id: i64,
    },
    TabUpdated {
        #[serde(rename = "tabId")]
        tab_id: i64,
        #[serde(rename = "changeInfo", default)]
        change_info: TabChangeInfo,
        tab: TabSnapshot,
    },
    WindowFocusChanged {
        #[serde(rename = "windowId")]
        window_id: i64,
    },
    Startup,
}

/// A tab update is reported only for the active tab, and only once its URL
/// changed or it finished loading.
pub fn should_report_update(change: &TabChangeInfo, tab: &TabSnapshot) -> bool {
    tab.active && (change.url_changed() || change.load_completed())
}

pub struct ActivityBridge<S> {
    source: S,
    transmitter: Transmitter,
}

impl<S: TabSource> ActivityBridge<S> {
    pub fn new(source: S, transmitter: Transmitter) -> Self {
        Self {
            source,
            transmitter,
        }
    }

    /// Bridge talking to the registered native host through a child process.
    pub fn with_config(source: S, config: &BridgeConfig) -> Self {
        let connector = ProcessConnector::new(
            ManifestLocator::new(config.manifest_dirs.clone()),
            config.extension_id.clone(),
        );
        let connections = ConnectionManager::new(config.host_name.clone(), Box::new(connector));
        Self::new(source, Transmitter::new(connections))
    }

    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }

    /// Dispatch one browser event. Returns the outcome if a transmit was attempted.
    pub fn handle_event(&self, event: &BrowserEvent) -> Option<TransmitOutcome> {
        match event {
            BrowserEvent::TabActivated { tab_id } => self.on_tab_activated(*tab_id),
            BrowserEvent::TabUpdated {
                tab_id,
                change_info,
                tab,
            } => self.on_tab_updated(*tab_id, change_info, tab),
            BrowserEvent::WindowFocusChanged { window_id } => {
                self.on_window_focus_changed(*window_id)
            }
            BrowserEvent::Startup => self.on_startup(),
        }
    }

    pub fn on_tab_activated(&self, tab_id: i64) -> Option<TransmitOutcome> {
        match self.source.get_tab(tab_id) {
            Ok(tab) => Some(self.transmitter.transmit(Some(&tab))),
            Err(e) => {
                error!("Error fetching activated tab {tab_id}: {e}");
                None
            }
        }
    }

    pub fn on_tab_updated(
        &self,
        tab_id: i64,
        change: &TabChangeInfo,
        tab: &TabSnapshot,
    ) -> Option<TransmitOutcome> {
        if !should_report_update(change, tab) {
            debug!("Ignoring update for tab {tab_id}");
            return None;
        }
        Some(self.transmitter.transmit(Some(tab)))
    }

    pub fn on_window_focus_changed(&self, window_id: i64) -> Option<TransmitOutcome> {
        if window_id == WINDOW_ID_NONE {
            return None;
        }
        self.transmit_first_active(&TabQuery::active_in(WindowScope::Id(window_id)), "focused window")
    }

    pub fn on_startup(&self) -> Option<TransmitOutcome> {
        self.transmit_first_active(&TabQuery::active_in(WindowScope::Current), "startup")
    }

    fn transmit_first_active(&self, query: &TabQuery, context: &str) -> Option<TransmitOutcome> {
        match self.source.query_tabs(query) {
            Ok(tabs) => tabs
                .first()
                .map(|tab| self.transmitter.transmit(Some(tab))),
            Err(e) => {
                error!("Error fetching {context} tab: {e}");
                None
            }
        }
    }
}
