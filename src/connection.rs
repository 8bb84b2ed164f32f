//! Connection Manager — one lazily opened local-socket connection per client.
//!
//! Uses `interprocess` for the transport:
//!   - Unix/macOS: Unix domain sockets
//!   - Windows: Named pipes
//!
//! Connect, spawn-on-demand and writes all run under a single mutex, so at most
//! one connection attempt is in flight and records never interleave on the wire.
//! Connect and write are each bounded to 1s on a helper thread. A failed or
//! timed-out write drops the handle; the next send reconnects from scratch.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::constants::{CONNECT_TIMEOUT, WRITE_TIMEOUT};
use crate::error::{WraithError, WraithResult};
use crate::spawner::CollectorLauncher;

/// Writable half of a collector connection.
pub trait Transport: Write + Send {}

impl<T: Write + Send> Transport for T {}

/// Opens transports to the collector endpoint.
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &Path, timeout: Duration) -> WraithResult<Box<dyn Transport>>;
}

/// Default connector: `interprocess` local socket, connect bounded by `timeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSocketConnector;

impl Connector for LocalSocketConnector {
    fn connect(&self, endpoint: &Path, timeout: Duration) -> WraithResult<Box<dyn Transport>> {
        let sock_path = endpoint.to_path_buf();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::Builder::new()
            .name("wraith-connect".into())
            .spawn(move || {
                tx.send(open_local_socket(&sock_path)).ok();
            })?;

        match rx.recv_timeout(timeout) {
            Ok(Ok(stream)) => Ok(Box::new(stream)),
            Ok(Err(e)) => Err(WraithError::Connect(format!("{}: {}", endpoint.display(), e))),
            Err(_) => Err(WraithError::Connect(format!(
                "timeout after {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

fn open_local_socket(sock_path: &Path) -> std::io::Result<interprocess::local_socket::Stream> {
    use interprocess::local_socket::{prelude::*, GenericFilePath};

    let name = sock_path.to_fs_name::<GenericFilePath>()?;
    interprocess::local_socket::Stream::connect(name)
}

/// Write one record on a helper thread, giving the transport back only if the
/// write completed within `timeout`.
///
/// On timeout the helper keeps the transport and stays parked in `write` until
/// the collector drains or closes the socket; the caller has already moved on.
fn write_bounded(
    mut transport: Box<dyn Transport>,
    line: String,
    timeout: Duration,
) -> WraithResult<Box<dyn Transport>> {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::Builder::new()
        .name("wraith-write".into())
        .spawn(move || {
            let written = transport
                .write_all(line.as_bytes())
                .and_then(|_| transport.flush());
            tx.send(written.map(|_| transport)).ok();
        })?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(transport)) => Ok(transport),
        Ok(Err(e)) => Err(WraithError::Transport(e.to_string())),
        Err(_) => Err(WraithError::Transport(format!(
            "write timeout after {}ms",
            timeout.as_millis()
        ))),
    }
}

pub struct ConnectionManager {
    endpoint: PathBuf,
    connector: Box<dyn Connector>,
    launcher: Option<Box<dyn CollectorLauncher>>,
    write_timeout: Duration,
    conn: Mutex<Option<Box<dyn Transport>>>,
}

impl ConnectionManager {
    /// `launcher: None` disables auto-spawn.
    pub fn new(
        endpoint: PathBuf,
        connector: Box<dyn Connector>,
        launcher: Option<Box<dyn CollectorLauncher>>,
    ) -> Self {
        Self {
            endpoint,
            connector,
            launcher,
            write_timeout: WRITE_TIMEOUT,
            conn: Mutex::new(None),
        }
    }

    /// Override the per-write budget (default 1s).
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    pub fn auto_spawn(&self) -> bool {
        self.launcher.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Make sure a live handle exists. Concurrent callers wait on the in-flight attempt.
    pub fn ensure_connected(&self) -> bool {
        let mut slot = self.lock();
        match self.connect_locked(&mut slot) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Collector unavailable");
                false
            }
        }
    }

    /// Exactly one bounded write attempt. Never retries, never buffers.
    pub fn send_line(&self, line: &str) -> WraithResult<()> {
        let mut slot = self.lock();
        self.connect_locked(&mut slot)?;

        // The handle leaves the slot for the write; it only comes back on success.
        let transport = slot
            .take()
            .ok_or_else(|| WraithError::Connect("no connection after connect".into()))?;
        let transport = write_bounded(transport, line.to_string(), self.write_timeout)?;
        *slot = Some(transport);
        Ok(())
    }

    /// Close the live handle if any. Idempotent.
    pub fn shutdown(&self) {
        let mut slot = self.lock();
        if let Some(transport) = slot.take() {
            drop(transport);
            tracing::debug!("Collector connection closed");
        }
    }

    fn connect_locked(&self, slot: &mut Option<Box<dyn Transport>>) -> WraithResult<()> {
        if slot.is_some() {
            return Ok(());
        }

        if !self.endpoint_present() {
            let launched = match &self.launcher {
                Some(launcher) => launcher.launch(&self.endpoint),
                None => false,
            };
            if !launched {
                return Err(WraithError::Connect(format!(
                    "endpoint not found: {}",
                    self.endpoint.display()
                )));
            }
        }

        let transport = self.connector.connect(&self.endpoint, CONNECT_TIMEOUT)?;
        *slot = Some(transport);
        tracing::debug!(endpoint = %self.endpoint.display(), "Connected to collector");
        Ok(())
    }

    /// Named pipes leave no file behind, so only Unix checks the filesystem.
    fn endpoint_present(&self) -> bool {
        if cfg!(unix) {
            self.endpoint.exists()
        } else {
            true
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Transport>>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
