use thiserror::Error;

/// Internal failure taxonomy. None of these ever reach the calling tool:
/// emitter methods collapse them into `false` at the boundary.
#[derive(Error, Debug)]
pub enum WraithError {
    /// Telemetry disabled by option or consent.
    #[error("Telemetry disabled")]
    Disabled,

    /// Consent configuration unreadable or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// Installation id could not be persisted.
    #[error("Identity error: {0}")]
    Identity(String),

    /// Collector launch failed or endpoint never appeared.
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// Endpoint missing, connect timeout, or connect refused.
    #[error("Connect error: {0}")]
    Connect(String),

    /// Write to an established connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WraithResult<T> = Result<T, WraithError>;
