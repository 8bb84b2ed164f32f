//! Wire schema — one JSON object per line.
//!
//! ```text
//! {"level":"INFO","event_type":"tool_succeeded","tool":"migrateiq","command":"scan",
//!  "duration_ms":42,"context":{...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::context::EventContext;
use crate::error::WraithResult;

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            "FATAL" => Ok(Self::Fatal),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ToolInvoked,
    ToolSucceeded,
    ToolFailed,
    ExceptionUnhandled,
    ValidationFailed,
}

impl EventType {
    /// Level used when the caller does not pick one.
    pub fn default_level(&self) -> Level {
        match self {
            Self::ToolInvoked | Self::ToolSucceeded => Level::Info,
            Self::ToolFailed => Level::Error,
            Self::ExceptionUnhandled => Level::Fatal,
            Self::ValidationFailed => Level::Warning,
        }
    }
}

/// One telemetry record. Built right before the send, dropped right after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub level: Level,
    pub event_type: EventType,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub context: EventContext,
}

impl Event {
    fn base(event_type: EventType, level: Level, tool: &str, context: EventContext) -> Self {
        Self {
            level,
            event_type,
            tool: tool.to_string(),
            command: None,
            duration_ms: None,
            error_type: None,
            exception_type: None,
            traceback: None,
            validation_type: None,
            details: None,
            context,
        }
    }

    pub fn tool_invoked(tool: &str, command: &str, level: Level, context: EventContext) -> Self {
        let mut event = Self::base(EventType::ToolInvoked, level, tool, context);
        event.command = Some(command.to_string());
        event
    }

    pub fn tool_succeeded(
        tool: &str,
        command: &str,
        duration_ms: u64,
        level: Level,
        context: EventContext,
    ) -> Self {
        let mut event = Self::base(EventType::ToolSucceeded, level, tool, context);
        event.command = Some(command.to_string());
        event.duration_ms = Some(duration_ms);
        event
    }

    pub fn tool_failed(
        tool: &str,
        command: &str,
        error_type: &str,
        duration_ms: u64,
        level: Level,
        context: EventContext,
    ) -> Self {
        let mut event = Self::base(EventType::ToolFailed, level, tool, context);
        event.command = Some(command.to_string());
        event.error_type = Some(error_type.to_string());
        event.duration_ms = Some(duration_ms);
        event
    }

    pub fn exception_unhandled(
        tool: &str,
        exception_type: &str,
        traceback: Option<&str>,
        level: Level,
        context: EventContext,
    ) -> Self {
        let mut event = Self::base(EventType::ExceptionUnhandled, level, tool, context);
        event.exception_type = Some(exception_type.to_string());
        event.traceback = non_empty(traceback);
        event
    }

    pub fn validation_failed(
        tool: &str,
        validation_type: &str,
        details: Option<&str>,
        level: Level,
        context: EventContext,
    ) -> Self {
        let mut event = Self::base(EventType::ValidationFailed, level, tool, context);
        event.validation_type = Some(validation_type.to_string());
        event.details = non_empty(details);
        event
    }

    /// Serialized record plus the `\n` delimiter.
    pub fn to_wire_line(&self) -> WraithResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(String::from)
}
