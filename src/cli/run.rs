//! `wraith-emit run -- <program>`: track a child process like any tool command.

use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use thiserror::Error;
use wraith_client::WraithClient;

use super::SPAWN_FAILURE_CODE;

#[derive(Error, Debug)]
enum RunError {
    #[error("failed to start: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("exited with {0}")]
    Exit(ExitStatus),
}

impl RunError {
    fn tag(&self) -> &'static str {
        match self {
            Self::Spawn(_) => "spawn_error",
            Self::Exit(_) => "exit_status",
        }
    }
}

/// Returns the child's exit code (1 if it was killed by a signal).
pub fn run(client: &WraithClient, tool: &str, command: &str, argv: &[String]) -> Result<i32> {
    let (program, args) = argv.split_first().context("No program given after `--`")?;

    let outcome = client.track_command_with(
        tool,
        command,
        |e: &RunError| e.tag().to_string(),
        || {
            let status = Command::new(program).args(args).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(RunError::Exit(status))
            }
        },
    );

    match outcome {
        Ok(()) => Ok(0),
        Err(RunError::Exit(status)) => Ok(status.code().unwrap_or(1)),
        Err(e @ RunError::Spawn(_)) => Err(e).with_context(|| format!("Cannot run `{}`", program)),
    }
}

/// [`run`] as a process exit code: the child's own code, or 127 if it never started.
pub fn run_exit_code(client: &WraithClient, tool: &str, command: &str, argv: &[String]) -> i32 {
    match run(client, tool, command, argv) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            SPAWN_FAILURE_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wraith_client::connection::{Connector, Transport};
    use wraith_client::{ClientOptions, WraithResult};

    /// In-memory collector: every connection appends to one shared buffer.
    #[derive(Clone, Default)]
    struct MemoryCollector {
        sink: Arc<Mutex<Vec<u8>>>,
    }

    struct MemoryStream(Arc<Mutex<Vec<u8>>>);

    impl Write for MemoryStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Connector for MemoryCollector {
        fn connect(
            &self,
            _endpoint: &Path,
            _timeout: Duration,
        ) -> WraithResult<Box<dyn Transport>> {
            Ok(Box::new(MemoryStream(self.sink.clone())))
        }
    }

    impl MemoryCollector {
        fn records(&self) -> Vec<serde_json::Value> {
            let bytes = self.sink.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    fn client(home: &Path, collector: &MemoryCollector) -> WraithClient {
        let endpoint = home.join("wraith.sock");
        std::fs::write(&endpoint, "").unwrap();
        let options = ClientOptions::default()
            .home_dir(home)
            .socket_path(endpoint)
            .tool_version("1.4.0")
            .auto_spawn(false);
        WraithClient::with_connector(options, Box::new(collector.clone()))
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let collector = MemoryCollector::default();
        let client = client(dir.path(), &collector);

        let code = run(&client, "migrateiq", "scan", &argv(&["sh", "-c", "exit 3"])).unwrap();
        assert_eq!(code, 3);

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event_type"], "tool_invoked");
        assert_eq!(records[1]["event_type"], "tool_failed");
        assert_eq!(records[1]["error_type"], "exit_status");
        assert_eq!(records[1]["tool"], "migrateiq");
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_program_records_success() {
        let dir = tempfile::tempdir().unwrap();
        let collector = MemoryCollector::default();
        let client = client(dir.path(), &collector);

        assert_eq!(run(&client, "t", "c", &argv(&["true"])).unwrap(), 0);

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["event_type"], "tool_succeeded");
        assert!(records[1]["duration_ms"].as_u64().is_some());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let collector = MemoryCollector::default();
        let client = client(dir.path(), &collector);
        let missing = argv(&["wraith-emit-no-such-program-xyz"]);

        let err = run(&client, "t", "c", &missing).unwrap_err();
        assert!(format!("{:#}", err).contains("Cannot run `wraith-emit-no-such-program-xyz`"));

        let records = collector.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["event_type"], "tool_failed");
        assert_eq!(records[1]["error_type"], "spawn_error");
    }

    #[test]
    fn test_missing_program_exits_127() {
        let dir = tempfile::tempdir().unwrap();
        let collector = MemoryCollector::default();
        let client = client(dir.path(), &collector);

        let missing = argv(&["wraith-emit-no-such-program-xyz"]);
        let code = run_exit_code(&client, "t", "c", &missing);
        assert_eq!(code, SPAWN_FAILURE_CODE);
        assert_eq!(code, 127);
    }

    #[test]
    fn test_empty_argv_is_an_error_without_records() {
        let dir = tempfile::tempdir().unwrap();
        let collector = MemoryCollector::default();
        let client = client(dir.path(), &collector);

        assert!(run(&client, "t", "c", &[]).is_err());
        assert!(collector.records().is_empty());
    }
}
