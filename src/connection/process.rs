//! Channel to a native host running as a child process.

use super::{Connector, DisconnectNotifier, NativePort};
use crate::error::{BridgeError, Result};
use crate::manifest::ManifestLocator;
use crate::native_messaging::{read_message, write_message};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{mpsc, Mutex};
use std::thread;

/// Launches the registered host executable, as the browser does for `connectNative`.
#[derive(Debug, Clone)]
pub struct ProcessConnector {
    locator: ManifestLocator,
    extension_id: String,
}

impl ProcessConnector {
    pub fn new(locator: ManifestLocator, extension_id: impl Into<String>) -> Self {
        Self {
            locator,
            extension_id: extension_id.into(),
        }
    }
}

impl Connector for ProcessConnector {
    fn connect(
        &self,
        host_name: &str,
        on_disconnect: DisconnectNotifier,
    ) -> Result<Box<dyn NativePort>> {
        let located = self.locator.locate(host_name)?;
        let manifest = &located.manifest;
        if !manifest.allows_extension(&self.extension_id) {
            warn!(
                "Manifest {} does not list extension {}",
                located.manifest_path.display(),
                self.extension_id
            );
        }

        let mut child = Command::new(&manifest.path)
            .arg(&located.manifest_path)
            .arg(&self.extension_id)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                path: manifest.path.clone(),
                source,
            })?;

        let pid = child.id();
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            reap(&mut child);
            return Err(BridgeError::Spawn {
                path: manifest.path.clone(),
                source: std::io::Error::other("child pipes were not captured"),
            });
        };

        // The reader takes ownership of the child once it is running: it
        // drains replies, reports the disconnect and reaps the process.
        let (child_tx, child_rx) = mpsc::channel::<(Child, ChildStdout)>();
        let spawned = thread::Builder::new()
            .name(format!("native-host-{pid}"))
            .spawn(move || {
                if let Ok((child, stdout)) = child_rx.recv() {
                    drain_replies(child, stdout, on_disconnect);
                }
            });
        if let Err(source) = spawned {
            reap(&mut child);
            return Err(BridgeError::Spawn {
                path: manifest.path.clone(),
                source,
            });
        }
        if let Err(mpsc::SendError((mut child, _))) = child_tx.send((child, stdout)) {
            reap(&mut child);
            return Err(BridgeError::Spawn {
                path: manifest.path.clone(),
                source: std::io::Error::other("native host reader exited early"),
            });
        }

        info!("Launched native host {host_name} (pid {pid})");
        Ok(Box::new(ProcessPort {
            stdin: Mutex::new(stdin),
            pid,
        }))
    }
}

fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill native host {}: {e}", child.id());
    }
    if let Err(e) = child.wait() {
        debug!("Failed to reap native host {}: {e}", child.id());
    }
}

fn drain_replies(mut child: Child, mut stdout: ChildStdout, on_disconnect: DisconnectNotifier) {
    let pid = child.id();
    let lost_output = loop {
        match read_message(&mut stdout) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(reply) if reply.get("status").and_then(Value::as_str) == Some("error") => {
                    warn!("Native host {pid} reported an error: {reply}");
                }
                Ok(reply) => debug!("Native host {pid} replied: {reply}"),
                Err(e) => warn!("Native host {pid} sent invalid JSON: {e}"),
            },
            Ok(None) => break false,
            Err(e) => {
                warn!("Lost native host {pid} output: {e}");
                break true;
            }
        }
    };

    // Closed before any blocking wait: the host may keep running after its
    // output is gone, and writers must stop using the channel right away.
    on_disconnect.notify();

    if lost_output {
        reap(&mut child);
        return;
    }
    match child.wait() {
        Ok(status) if status.success() => info!("Native host {pid} exited"),
        Ok(status) => warn!("Native host {pid} exited with {status}"),
        Err(e) => error!("Failed to wait for native host {pid}: {e}"),
    }
}

struct ProcessPort {
    stdin: Mutex<ChildStdin>,
    pid: u32,
}

impl NativePort for ProcessPort {
    fn post_message(&self, payload: &[u8]) -> Result<()> {
        let mut stdin = self.stdin.lock().map_err(|_| BridgeError::LockPoisoned)?;
        write_message(&mut *stdin, payload)?;
        debug!("Wrote {} bytes to native host {}", payload.len(), self.pid);
        Ok(())
    }
}
