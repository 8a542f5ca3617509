use serde::{Deserialize, Serialize};

/// Load state the browser reports for a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Point-in-time read of a tab, as the browser's tab API describes it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    #[serde(rename = "id")]
    pub tab_id: i64,
    pub window_id: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub status: Option<TabStatus>,
}

impl TabSnapshot {
    pub fn new(tab_id: i64, window_id: i64, url: Option<&str>, title: Option<&str>) -> Self {
        Self {
            tab_id,
            window_id,
            url: url.map(ToString::to_string),
            title: title.map(ToString::to_string),
            active: false,
            status: None,
        }
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Fields that changed in a tab-updated event. Absent fields did not change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TabChangeInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<TabStatus>,
}

impl TabChangeInfo {
    pub fn url_changed(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn load_completed(&self) -> bool {
        self.status == Some(TabStatus::Complete)
    }
}
