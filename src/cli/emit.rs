//! One-shot emit subcommands. Always exit 0: telemetry never fails a caller.

use wraith_client::{EventType, Level, WraithClient};

fn report(sent: bool, quiet: bool) -> i32 {
    if !quiet {
        println!("{}", if sent { "sent" } else { "dropped" });
    }
    0
}

pub fn invoked(
    client: &WraithClient,
    tool: &str,
    command: &str,
    level: Option<Level>,
    quiet: bool,
) -> i32 {
    let level = level.unwrap_or(EventType::ToolInvoked.default_level());
    report(client.tool_invoked_with_level(tool, command, level), quiet)
}

pub fn succeeded(
    client: &WraithClient,
    tool: &str,
    command: &str,
    duration_ms: u64,
    level: Option<Level>,
    quiet: bool,
) -> i32 {
    let level = level.unwrap_or(EventType::ToolSucceeded.default_level());
    report(
        client.tool_succeeded_with_level(tool, command, duration_ms, level),
        quiet,
    )
}

pub fn failed(
    client: &WraithClient,
    tool: &str,
    command: &str,
    error_type: &str,
    duration_ms: u64,
    level: Option<Level>,
    quiet: bool,
) -> i32 {
    let level = level.unwrap_or(EventType::ToolFailed.default_level());
    report(
        client.tool_failed_with_level(tool, command, error_type, duration_ms, level),
        quiet,
    )
}

pub fn exception(
    client: &WraithClient,
    tool: &str,
    exception_type: &str,
    traceback: Option<&str>,
    level: Option<Level>,
    quiet: bool,
) -> i32 {
    let level = level.unwrap_or(EventType::ExceptionUnhandled.default_level());
    report(
        client.exception_unhandled_with_level(tool, exception_type, traceback, level),
        quiet,
    )
}

pub fn validation(
    client: &WraithClient,
    tool: &str,
    validation_type: &str,
    details: Option<&str>,
    level: Option<Level>,
    quiet: bool,
) -> i32 {
    let level = level.unwrap_or(EventType::ValidationFailed.default_level());
    report(
        client.validation_failed_with_level(tool, validation_type, details, level),
        quiet,
    )
}
