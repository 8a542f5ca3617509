use crate::models::TabSnapshot;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The record sent to the native host for one eligible tab.
///
/// Field names and order are the wire format:
/// `{"url","title","tabId","windowId","timestamp"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub tab_id: i64,
    pub window_id: i64,
    pub timestamp: String,
}

/// Render an instant the way the browser's `toISOString` does.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ActivityRecord {
    /// Builds a record stamped with `at`. Returns `None` if the tab has no URL.
    pub fn from_snapshot(tab: &TabSnapshot, at: DateTime<Utc>) -> Option<Self> {
        let url = tab.url.clone()?;
        Some(Self {
            url,
            title: tab.title.clone().unwrap_or_default(),
            tab_id: tab.tab_id,
            window_id: tab.window_id,
            timestamp: format_timestamp(at),
        })
    }

    /// Builds a record stamped with the current instant.
    pub fn capture(tab: &TabSnapshot) -> Option<Self> {
        Self::from_snapshot(tab, Utc::now())
    }
}

/// Host part of a URL, used where the full URL should not be logged.
pub fn url_domain(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
