//! Collector auto-spawn.
//!
//! Launches `<collector> --parent-pid <pid>` fully detached (own session, null stdio),
//! then polls for the endpoint every 100ms, at most 10 times.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use crate::constants::{PARENT_PID_FLAG, SPAWN_POLL_ATTEMPTS, SPAWN_POLL_INTERVAL};
use crate::error::{WraithError, WraithResult};
use crate::locator;

/// Brings a collector up when its endpoint is missing.
pub trait CollectorLauncher: Send + Sync {
    /// True once the endpoint exists. Must stay within the spawn-wait budget.
    fn launch(&self, endpoint: &Path) -> bool;
}

/// Default launcher: locate the collector under `home`, then spawn it.
#[derive(Debug, Clone)]
pub struct AutoSpawn {
    home: PathBuf,
}

impl AutoSpawn {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }
}

impl CollectorLauncher for AutoSpawn {
    fn launch(&self, endpoint: &Path) -> bool {
        match locator::locate(&self.home) {
            Some(collector) => spawn_and_wait_for_endpoint(&collector, endpoint),
            None => false,
        }
    }
}

/// Spawn the collector and wait (bounded) for its endpoint. Never fails loudly.
pub fn spawn_and_wait_for_endpoint(collector: &Path, endpoint: &Path) -> bool {
    match spawn_detached(collector) {
        Ok(child) => {
            tracing::info!(pid = child.id(), path = %collector.display(), "Collector spawned");
            reap(child);
        }
        Err(e) => {
            tracing::debug!(error = %e, "Collector spawn failed");
            return false;
        }
    }

    let ready = wait_for_endpoint(endpoint, SPAWN_POLL_ATTEMPTS, SPAWN_POLL_INTERVAL);
    if !ready {
        tracing::debug!(
            endpoint = %endpoint.display(),
            "Collector endpoint did not appear in time"
        );
    }
    ready
}

fn spawn_detached(collector: &Path) -> WraithResult<Child> {
    let mut cmd = Command::new(collector);
    cmd.arg(PARENT_PID_FLAG)
        .arg(std::process::id().to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    cmd.spawn()
        .map_err(|e| WraithError::Spawn(format!("{}: {}", collector.display(), e)))
}

/// Waits on the child in the background so it never lingers as a zombie.
fn reap(mut child: Child) {
    let spawned = std::thread::Builder::new()
        .name("wraith-reaper".into())
        .spawn(move || {
            let _ = child.wait();
        });
    if let Err(e) = spawned {
        tracing::debug!(error = %e, "Reaper thread not started");
    }
}

/// Poll for the endpoint: sleep, then check, up to `attempts` times.
pub fn wait_for_endpoint(endpoint: &Path, attempts: u32, interval: Duration) -> bool {
    for _ in 0..attempts {
        std::thread::sleep(interval);
        if endpoint.exists() {
            return true;
        }
    }
    false
}
