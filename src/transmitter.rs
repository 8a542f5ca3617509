use crate::connection::ConnectionManager;
use crate::error::BridgeError;
use crate::filter::is_eligible;
use crate::models::{ActivityRecord, TabSnapshot};
use log::{debug, warn};

/// Which branch a [`Transmitter::transmit`] call took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitOutcome {
    /// Filtered out; nothing touched.
    Ineligible,
    /// The host could not be reached; the record was dropped.
    NoConnection,
    Sent,
    /// The write failed; the record was dropped and the channel invalidated.
    SendFailed,
}

/// Turns eligible tabs into records and writes them to the native host.
///
/// Best effort only: nothing is buffered, retried or acknowledged.
#[derive(Debug)]
pub struct Transmitter {
    connections: ConnectionManager,
}

impl Transmitter {
    pub fn new(connections: ConnectionManager) -> Self {
        Self { connections }
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn transmit(&self, tab: Option<&TabSnapshot>) -> TransmitOutcome {
        if !is_eligible(tab) {
            return TransmitOutcome::Ineligible;
        }
        let Some(record) = tab.and_then(ActivityRecord::capture) else {
            return TransmitOutcome::Ineligible;
        };

        let Some(handle) = self.connections.ensure_connection() else {
            debug!(
                "Dropping record for tab {}: {} is not connected",
                record.tab_id,
                self.connections.host_name()
            );
            return TransmitOutcome::NoConnection;
        };

        let sent = serde_json::to_vec(&record)
            .map_err(BridgeError::from)
            .and_then(|payload| handle.post_message(&payload));
        match sent {
            Ok(()) => {
                debug!(
                    "Sent tab {} (window {}) to native host",
                    record.tab_id, record.window_id
                );
                TransmitOutcome::Sent
            }
            Err(e) => {
                warn!("Failed to send message to native host: {e}");
                self.connections.invalidate(&handle);
                TransmitOutcome::SendFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;
    use crate::test_utils::FakeConnector;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn transmitter(connector: &FakeConnector) -> Transmitter {
        Transmitter::new(ConnectionManager::new(
            "activity_logger_bridge",
            Box::new(connector.clone()),
        ))
    }

    #[test]
    fn test_sends_one_record_for_eligible_tab() {
        let connector = FakeConnector::new();
        let transmitter = transmitter(&connector);
        let tab = TabSnapshot::new(7, 1, Some("https://example.com"), Some("Ex"));

        let before = Utc::now();
        let outcome = transmitter.transmit(Some(&tab));
        let after = Utc::now();

        assert_eq!(outcome, TransmitOutcome::Sent);
        let sent = connector.sent_json();
        assert_eq!(sent.len(), 1);

        let mut record = sent.into_iter().next().unwrap();
        let timestamp = record["timestamp"].as_str().unwrap().to_string();
        record.as_object_mut().unwrap().remove("timestamp");
        assert_eq!(
            record,
            json!({"url": "https://example.com", "title": "Ex", "tabId": 7, "windowId": 1})
        );

        assert!(timestamp.ends_with('Z'));
        let at: DateTime<Utc> = timestamp.parse().unwrap();
        let millis = |t: DateTime<Utc>| t.timestamp_millis();
        assert!(millis(before) <= millis(at) && millis(at) <= millis(after));
    }

    #[test]
    fn test_internal_page_never_opens_connection() {
        let connector = FakeConnector::new();
        let transmitter = transmitter(&connector);
        let tab = TabSnapshot::new(1, 1, Some("about:preferences"), Some("Settings"));

        assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::Ineligible);
        assert_eq!(connector.attempts(), 0);
        assert!(connector.sent().is_empty());
        assert_eq!(transmitter.connections().state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_absent_tab_is_ignored() {
        let connector = FakeConnector::new();
        let transmitter = transmitter(&connector);
        assert_eq!(transmitter.transmit(None), TransmitOutcome::Ineligible);
        assert_eq!(connector.attempts(), 0);
    }

    #[test]
    fn test_unreachable_host_drops_silently() {
        let connector = FakeConnector::new();
        connector.set_refuse(true);
        let transmitter = transmitter(&connector);
        let tab = TabSnapshot::new(1, 1, Some("https://example.com"), None);

        assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::NoConnection);
        assert!(connector.sent().is_empty());
        assert!(!transmitter.connections().is_connected());
    }

    #[test]
    fn test_send_failure_invalidates_without_retry() {
        let connector = FakeConnector::new();
        let transmitter = transmitter(&connector);
        let tab = TabSnapshot::new(1, 1, Some("https://example.com"), None);

        assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::Sent);
        connector.set_fail_sends(true);
        assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::SendFailed);
        assert!(!transmitter.connections().is_connected());
        assert_eq!(connector.attempts(), 1);

        // The failed record is gone; the next one reconnects from scratch.
        connector.set_fail_sends(false);
        assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::Sent);
        assert_eq!(connector.attempts(), 2);
        assert_eq!(connector.sent().len(), 2);
    }

    #[test]
    fn test_reuses_connection_across_records() {
        let connector = FakeConnector::new();
        let transmitter = transmitter(&connector);

        for id in 0..3 {
            let tab = TabSnapshot::new(id, 1, Some("https://example.com"), None);
            assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::Sent);
        }
        assert_eq!(connector.attempts(), 1);
        assert_eq!(connector.sent().len(), 3);
    }

    #[test]
    fn test_reconnects_after_host_exit() {
        let connector = FakeConnector::new();
        let transmitter = transmitter(&connector);
        let tab = TabSnapshot::new(1, 1, Some("https://example.com"), None);

        transmitter.transmit(Some(&tab));
        connector.disconnect_all();
        assert_eq!(transmitter.transmit(Some(&tab)), TransmitOutcome::Sent);
        assert_eq!(connector.attempts(), 2);
    }
}
