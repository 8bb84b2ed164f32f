//! Wraith Client — fire-and-forget telemetry for InfraIQ tools.
//!
//! Sends tool lifecycle events to the local Wraith collector over a local socket
//! (`~/.infraiq/wraith.sock`), one JSON object per line. Every operation is
//! bounded and fails silently: a missing or broken collector never changes the
//! caller's behavior, only the `bool` returned by the emitter methods.

// Foundation
pub mod constants;
pub mod error;
pub mod paths;

// Components
pub mod client;
pub mod connection;
pub mod consent;
pub mod context;
pub mod event;
pub mod identity;
pub mod locator;
pub mod spawner;
pub mod tracker;

pub mod tracing_init;

// Re-exports for convenience
pub use client::{get_client, init_client, ClientOptions, WraithClient};
pub use context::EventContext;
pub use error::{WraithError, WraithResult};
pub use event::{Event, EventType, Level};
pub use tracker::CommandSpan;
