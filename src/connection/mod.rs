//! Lifecycle of the single channel to the native host.
//!
//! The channel is opened lazily on the first record that needs it and
//! forgotten as soon as the host goes away or a write fails. Nothing retries
//! in the background: the next record simply tries again.

pub mod process;

pub use process::ProcessConnector;

use crate::error::Result;
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError, Weak};

/// Write side of an open channel
pub trait NativePort: Send + Sync {
    /// Send one serialized JSON message.
    fn post_message(&self, payload: &[u8]) -> Result<()>;
}

/// Opens channels to a named native host
pub trait Connector: Send + Sync {
    /// Open a channel to `host_name`.
    ///
    /// `on_disconnect` must be notified once the channel closes, whenever
    /// that happens. Dropping it without notifying is allowed when the
    /// connection attempt fails.
    fn connect(
        &self,
        host_name: &str,
        on_disconnect: DisconnectNotifier,
    ) -> Result<Box<dyn NativePort>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// A live channel as handed out by [`ConnectionManager::ensure_connection`].
#[derive(Clone)]
pub struct ConnectionHandle {
    port: Arc<dyn NativePort>,
    generation: u64,
    closed: Arc<AtomicBool>,
}

impl ConnectionHandle {
    pub fn post_message(&self, payload: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(crate::error::BridgeError::Disconnected);
        }
        self.port.post_message(payload)
    }

    /// Establishment counter; two handles with the same generation share a channel.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("generation", &self.generation)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Slot {
    current: Option<ConnectionHandle>,
    generation: u64,
}

/// Disconnect observer registered with every channel.
///
/// Marks its own channel closed and clears the manager's slot if the slot
/// still holds that channel. Safe to fire from any thread, at any time,
/// including after the manager is gone.
pub struct DisconnectNotifier {
    slot: Weak<Mutex<Slot>>,
    generation: u64,
    closed: Arc<AtomicBool>,
}

impl DisconnectNotifier {
    pub fn notify(self) {
        self.closed.store(true, Ordering::SeqCst);

        let Some(slot) = self.slot.upgrade() else {
            return;
        };
        // The closed flag is enough for correctness; clearing the slot here
        // only releases the port early. Never block on our own establishment.
        let mut guard = match slot.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return,
        };
        if guard
            .current
            .as_ref()
            .is_some_and(|h| h.generation == self.generation)
        {
            guard.current = None;
            info!("Native host disconnected (connection {})", self.generation);
        }
    }
}

impl fmt::Debug for DisconnectNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisconnectNotifier")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Lock a mutex, recovering from poisoning if necessary
fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Sole owner of the current channel.
pub struct ConnectionManager {
    host_name: String,
    connector: Box<dyn Connector>,
    slot: Arc<Mutex<Slot>>,
}

impl ConnectionManager {
    pub fn new(host_name: impl Into<String>, connector: Box<dyn Connector>) -> Self {
        Self {
            host_name: host_name.into(),
            connector,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Return the open channel, opening one if there is none.
    ///
    /// Returns `None` when the host cannot be reached; the failure is logged
    /// and the next call tries again from scratch.
    pub fn ensure_connection(&self) -> Option<ConnectionHandle> {
        let mut slot = safe_lock(&self.slot, "Connection");

        if let Some(handle) = &slot.current {
            if !handle.is_closed() {
                return Some(handle.clone());
            }
            debug!("Discarding closed connection {}", handle.generation);
            slot.current = None;
        }

        slot.generation += 1;
        let generation = slot.generation;
        let closed = Arc::new(AtomicBool::new(false));
        let notifier = DisconnectNotifier {
            slot: Arc::downgrade(&self.slot),
            generation,
            closed: Arc::clone(&closed),
        };

        let port = match self.connector.connect(&self.host_name, notifier) {
            Ok(port) => port,
            Err(e) if e.is_establishment_failure() => {
                warn!("Native host {} is unavailable: {e}", self.host_name);
                return None;
            }
            Err(e) => {
                error!("Failed to connect to native host {}: {e}", self.host_name);
                return None;
            }
        };

        if closed.load(Ordering::SeqCst) {
            warn!(
                "Native host {} disconnected while connecting",
                self.host_name
            );
            return None;
        }

        let handle = ConnectionHandle {
            port: Arc::from(port),
            generation,
            closed,
        };
        info!(
            "Connected to native host {} (connection {generation})",
            self.host_name
        );
        slot.current = Some(handle.clone());
        Some(handle)
    }

    /// Forget `handle` after a failed write. A newer channel is left alone.
    pub fn invalidate(&self, handle: &ConnectionHandle) {
        handle.closed.store(true, Ordering::SeqCst);

        let mut slot = safe_lock(&self.slot, "Connection");
        if slot
            .current
            .as_ref()
            .is_some_and(|h| h.generation == handle.generation)
        {
            slot.current = None;
            info!("Invalidated connection {}", handle.generation);
        }
    }

    pub fn state(&self) -> ConnectionState {
        let slot = safe_lock(&self.slot, "Connection");
        match &slot.current {
            Some(handle) if !handle.is_closed() => ConnectionState::Connected,
            Some(_) | None => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("host_name", &self.host_name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
