//! Wraith client — process-wide telemetry emitter.
//!
//! All emitter methods are fire-and-forget: they return `true` when the record was
//! accepted by the transport and `false` otherwise. They never panic or error.
//!
//! ```no_run
//! let client = wraith_client::get_client();
//! client.tool_invoked("migrateiq", "scan");
//! client.tool_succeeded("migrateiq", "scan", 1234);
//! ```

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use crate::connection::{ConnectionManager, Connector, LocalSocketConnector};
use crate::constants::{ENV_TOOL_VERSION, UNKNOWN};
use crate::context::EventContext;
use crate::error::{WraithError, WraithResult};
use crate::event::{Event, EventType, Level};
use crate::spawner::{AutoSpawn, CollectorLauncher};
use crate::{consent, identity, paths};

static GLOBAL: OnceLock<WraithClient> = OnceLock::new();
static EXIT_HOOK: Once = Once::new();

/// Construction options. `Default` gives the standard `~/.infraiq` layout.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Directory holding `.infraiq/` (default: `INFRAIQ_HOME`, then the user's home).
    pub home_dir: Option<PathBuf>,
    /// Collector endpoint (default: `{home}/.infraiq/wraith.sock`).
    pub socket_path: Option<PathBuf>,
    /// Reported tool version (default: `INFRAIQ_VERSION`, then `"unknown"`).
    pub tool_version: Option<String>,
    /// Spawn the collector when its endpoint is missing.
    pub auto_spawn: bool,
    /// Caller-side switch; ANDed with the user's consent.
    pub enabled: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            home_dir: None,
            socket_path: None,
            tool_version: None,
            auto_spawn: true,
            enabled: true,
        }
    }
}

impl ClientOptions {
    pub fn home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    pub fn tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }

    pub fn auto_spawn(mut self, auto_spawn: bool) -> Self {
        self.auto_spawn = auto_spawn;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Client state. `enabled`, endpoint, tool version and installation id are fixed at
/// construction; only the connection inside `ConnectionManager` changes.
pub struct WraithClient {
    enabled: bool,
    tool_version: String,
    installation_id: String,
    connection: ConnectionManager,
}

impl WraithClient {
    pub fn new(options: ClientOptions) -> Self {
        Self::with_connector(options, Box::new(LocalSocketConnector))
    }

    /// Same as [`WraithClient::new`] with a custom transport.
    pub fn with_connector(options: ClientOptions, connector: Box<dyn Connector>) -> Self {
        let home = resolve_home(&options);
        let launcher: Option<Box<dyn CollectorLauncher>> = if options.auto_spawn {
            Some(Box::new(AutoSpawn::new(home)))
        } else {
            None
        };
        Self::with_launcher(options, connector, launcher)
    }

    /// Full injection: custom transport and collector launcher (`None` = no auto-spawn).
    pub fn with_launcher(
        options: ClientOptions,
        connector: Box<dyn Connector>,
        launcher: Option<Box<dyn CollectorLauncher>>,
    ) -> Self {
        let home = resolve_home(&options);
        let enabled = options.enabled && consent::is_enabled(&home);
        let endpoint = options
            .socket_path
            .unwrap_or_else(|| paths::socket_path(&home));
        let tool_version = options.tool_version.unwrap_or_else(default_tool_version);
        let installation_id = identity::get_or_create(&paths::installation_id_path(&home));

        tracing::debug!(
            enabled,
            endpoint = %endpoint.display(),
            auto_spawn = launcher.is_some(),
            "Wraith client initialized"
        );

        Self {
            enabled,
            tool_version,
            installation_id,
            connection: ConnectionManager::new(endpoint, connector, launcher),
        }
    }

    /// Process-wide instance, built from default options on first use.
    pub fn global() -> &'static Self {
        Self::global_with(ClientOptions::default())
    }

    /// Process-wide instance. `options` only apply if this call creates it.
    pub fn global_with(options: ClientOptions) -> &'static Self {
        let client = GLOBAL.get_or_init(|| Self::new(options));
        register_exit_hook();
        client
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn endpoint(&self) -> &Path {
        self.connection.endpoint()
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn installation_id(&self) -> &str {
        &self.installation_id
    }

    pub fn auto_spawn(&self) -> bool {
        self.connection.auto_spawn()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Connect (spawning the collector if allowed) without sending anything.
    pub fn ensure_connected(&self) -> bool {
        self.enabled && self.connection.ensure_connected()
    }

    /// Close the connection. Safe to call any number of times.
    pub fn shutdown(&self) {
        self.connection.shutdown();
    }

    pub fn context(&self) -> EventContext {
        EventContext::build(&self.installation_id, &self.tool_version)
    }

    /// Deliver a prebuilt event. One write attempt at most.
    pub fn send(&self, event: &Event) -> bool {
        self.emit(|| event.clone())
    }

    // ------------------------------------------------------------------------
    // Event methods
    // ------------------------------------------------------------------------

    pub fn tool_invoked(&self, tool: &str, command: &str) -> bool {
        self.tool_invoked_with_level(tool, command, EventType::ToolInvoked.default_level())
    }

    pub fn tool_invoked_with_level(&self, tool: &str, command: &str, level: Level) -> bool {
        self.emit(|| Event::tool_invoked(tool, command, level, self.context()))
    }

    pub fn tool_succeeded(&self, tool: &str, command: &str, duration_ms: u64) -> bool {
        self.tool_succeeded_with_level(
            tool,
            command,
            duration_ms,
            EventType::ToolSucceeded.default_level(),
        )
    }

    pub fn tool_succeeded_with_level(
        &self,
        tool: &str,
        command: &str,
        duration_ms: u64,
        level: Level,
    ) -> bool {
        self.emit(|| Event::tool_succeeded(tool, command, duration_ms, level, self.context()))
    }

    /// `error_type` is a type tag (class / variant name), never a message.
    pub fn tool_failed(
        &self,
        tool: &str,
        command: &str,
        error_type: &str,
        duration_ms: u64,
    ) -> bool {
        self.tool_failed_with_level(
            tool,
            command,
            error_type,
            duration_ms,
            EventType::ToolFailed.default_level(),
        )
    }

    pub fn tool_failed_with_level(
        &self,
        tool: &str,
        command: &str,
        error_type: &str,
        duration_ms: u64,
        level: Level,
    ) -> bool {
        self.emit(|| {
            Event::tool_failed(
                tool,
                command,
                error_type,
                duration_ms,
                level,
                self.context(),
            )
        })
    }

    /// `traceback` should already be sanitized; an empty one is omitted.
    pub fn exception_unhandled(
        &self,
        tool: &str,
        exception_type: &str,
        traceback: Option<&str>,
    ) -> bool {
        self.exception_unhandled_with_level(
            tool,
            exception_type,
            traceback,
            EventType::ExceptionUnhandled.default_level(),
        )
    }

    pub fn exception_unhandled_with_level(
        &self,
        tool: &str,
        exception_type: &str,
        traceback: Option<&str>,
        level: Level,
    ) -> bool {
        self.emit(|| {
            Event::exception_unhandled(tool, exception_type, traceback, level, self.context())
        })
    }

    pub fn validation_failed(
        &self,
        tool: &str,
        validation_type: &str,
        details: Option<&str>,
    ) -> bool {
        self.validation_failed_with_level(
            tool,
            validation_type,
            details,
            EventType::ValidationFailed.default_level(),
        )
    }

    pub fn validation_failed_with_level(
        &self,
        tool: &str,
        validation_type: &str,
        details: Option<&str>,
        level: Level,
    ) -> bool {
        self.emit(|| {
            Event::validation_failed(tool, validation_type, details, level, self.context())
        })
    }

    /// Boundary: every internal error or panic collapses to `false` here.
    fn emit(&self, build: impl FnOnce() -> Event) -> bool {
        if !self.enabled {
            return false;
        }
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| self.try_send(&build())));
        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Telemetry event dropped");
                false
            }
            Err(_) => {
                tracing::debug!("Telemetry event dropped after internal panic");
                false
            }
        }
    }

    fn try_send(&self, event: &Event) -> WraithResult<()> {
        if !self.enabled {
            return Err(WraithError::Disabled);
        }
        let line = event.to_wire_line()?;
        self.connection.send_line(&line)
    }
}

/// Process-wide client (see [`WraithClient::global`]).
pub fn get_client() -> &'static WraithClient {
    WraithClient::global()
}

/// Build the process-wide client with explicit options if it does not exist yet.
pub fn init_client(options: ClientOptions) -> &'static WraithClient {
    WraithClient::global_with(options)
}

fn resolve_home(options: &ClientOptions) -> PathBuf {
    options.home_dir.clone().unwrap_or_else(paths::home_dir)
}

fn default_tool_version() -> String {
    std::env::var(ENV_TOOL_VERSION)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn register_exit_hook() {
    EXIT_HOOK.call_once(|| {
        // SAFETY: registers a plain extern "C" fn with no captured state.
        let rc = unsafe { libc::atexit(shutdown_at_exit) };
        if rc != 0 {
            tracing::debug!("atexit registration failed, connection closes with the process");
        }
    });
}

extern "C" fn shutdown_at_exit() {
    let _ = std::panic::catch_unwind(|| {
        if let Some(client) = GLOBAL.get() {
            client.shutdown();
        }
    });
}
