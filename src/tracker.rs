//! Scoped command tracking.
//!
//! `start_command` emits `tool_invoked` and starts a monotonic timer; the returned
//! [`CommandSpan`] emits exactly one terminal event: `succeed`, `fail`, or on drop.
//! A span dropped unfinished records `tool_failed` with error type `panic` while
//! unwinding and `abandoned` otherwise.

use std::time::Instant;

use crate::client::WraithClient;

pub const PANIC_TAG: &str = "panic";
pub const ABANDONED_TAG: &str = "abandoned";

#[must_use = "dropping the span immediately records the command as abandoned"]
pub struct CommandSpan<'a> {
    client: &'a WraithClient,
    tool: String,
    command: String,
    started: Instant,
    finished: bool,
}

impl<'a> CommandSpan<'a> {
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn succeed(mut self) -> bool {
        self.finished = true;
        self.client
            .tool_succeeded(&self.tool, &self.command, self.elapsed_ms())
    }

    pub fn fail(mut self, error_type: &str) -> bool {
        self.finished = true;
        self.client
            .tool_failed(&self.tool, &self.command, error_type, self.elapsed_ms())
    }
}

impl Drop for CommandSpan<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let tag = if std::thread::panicking() {
            PANIC_TAG
        } else {
            ABANDONED_TAG
        };
        self.client
            .tool_failed(&self.tool, &self.command, tag, self.elapsed_ms());
    }
}

impl WraithClient {
    pub fn start_command(&self, tool: &str, command: &str) -> CommandSpan<'_> {
        self.tool_invoked(tool, command);
        CommandSpan {
            client: self,
            tool: tool.to_string(),
            command: command.to_string(),
            started: Instant::now(),
            finished: false,
        }
    }

    /// Run `work` bracketed by invoked / succeeded-or-failed events.
    /// The error is tagged with its type name and handed back untouched.
    pub fn track_command<T, E, F>(&self, tool: &str, command: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.track_command_with(tool, command, |_: &E| type_tag::<E>(), work)
    }

    /// Like [`WraithClient::track_command`] with a caller-chosen error tag.
    pub fn track_command_with<T, E, F, G>(
        &self,
        tool: &str,
        command: &str,
        tag: G,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        G: FnOnce(&E) -> String,
    {
        let span = self.start_command(tool, command);
        match work() {
            Ok(value) => {
                span.succeed();
                Ok(value)
            }
            Err(e) => {
                span.fail(&tag(&e));
                Err(e)
            }
        }
    }
}

/// Unqualified type name without generics: `std::io::error::Error` → `Error`.
pub fn type_tag<E>() -> String {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;
    use crate::connection::tests::FakeConnector;
    use std::path::Path;

    #[derive(Debug, PartialEq)]
    struct DiskFull {
        path: String,
    }

    #[derive(Debug, PartialEq)]
    enum ScanError {
        Timeout,
        Denied(u32),
    }

    fn fake_client(home: &Path, connector: &FakeConnector) -> WraithClient {
        let endpoint = home.join("wraith.sock");
        std::fs::write(&endpoint, "").unwrap();
        WraithClient::with_connector(
            ClientOptions::default()
                .home_dir(home)
                .socket_path(endpoint)
                .auto_spawn(false),
            Box::new(connector.clone()),
        )
    }

    fn records(connector: &FakeConnector) -> Vec<serde_json::Value> {
        connector
            .lines()
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_success_brackets_work() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FakeConnector::default();
        let client = fake_client(dir.path(), &connector);

        let out: Result<u32, DiskFull> = client.track_command("migrateiq", "scan", || Ok(7));
        assert_eq!(out, Ok(7));

        let recs = records(&connector);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0]["event_type"], "tool_invoked");
        assert_eq!(recs[1]["event_type"], "tool_succeeded");
        assert!(recs[1]["duration_ms"].as_u64().is_some());
    }

    #[test]
    fn test_failure_is_recorded_and_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FakeConnector::default();
        let client = fake_client(dir.path(), &connector);

        let out: Result<(), DiskFull> = client.track_command("migrateiq", "scan", || {
            Err(DiskFull { path: "/var".into() })
        });
        assert_eq!(out, Err(DiskFull { path: "/var".into() }));

        let recs = records(&connector);
        assert_eq!(recs[1]["event_type"], "tool_failed");
        assert_eq!(recs[1]["error_type"], "DiskFull");
        assert!(recs[1]["duration_ms"].as_u64().is_some());
    }

    #[test]
    fn test_failure_propagates_without_collector() {
        let dir = tempfile::tempdir().unwrap();
        let client = WraithClient::new(
            ClientOptions::default()
                .home_dir(dir.path())
                .auto_spawn(false),
        );

        let out: Result<(), ScanError> =
            client.track_command("t", "c", || Err(ScanError::Denied(3)));
        assert_eq!(out, Err(ScanError::Denied(3)));
        let ok: Result<&str, ScanError> = client.track_command("t", "c", || Ok("done"));
        assert_eq!(ok, Ok("done"));
    }

    #[test]
    fn test_custom_tag() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FakeConnector::default();
        let client = fake_client(dir.path(), &connector);

        let out: Result<(), ScanError> = client.track_command_with(
            "t",
            "c",
            |e| match e {
                ScanError::Timeout => "Timeout".to_string(),
                ScanError::Denied(_) => "Denied".to_string(),
            },
            || Err(ScanError::Timeout),
        );
        assert_eq!(out, Err(ScanError::Timeout));
        assert_eq!(records(&connector)[1]["error_type"], "Timeout");
    }

    #[test]
    fn test_panic_is_recorded_then_resumed() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FakeConnector::default();
        let client = fake_client(dir.path(), &connector);

        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), DiskFull> =
                client.track_command("t", "c", || panic!("work exploded"));
        }));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"work exploded"));

        let recs = records(&connector);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1]["event_type"], "tool_failed");
        assert_eq!(recs[1]["error_type"], PANIC_TAG);
    }

    #[test]
    fn test_span_abandoned_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FakeConnector::default();
        let client = fake_client(dir.path(), &connector);

        {
            let _span = client.start_command("t", "c");
        }
        let span = client.start_command("t", "c2");
        assert!(span.succeed());

        let recs = records(&connector);
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[1]["error_type"], ABANDONED_TAG);
        assert_eq!(recs[3]["event_type"], "tool_succeeded");
        assert_eq!(recs[3]["command"], "c2");
    }

    #[test]
    fn test_type_tag() {
        assert_eq!(type_tag::<DiskFull>(), "DiskFull");
        assert_eq!(type_tag::<std::io::Error>(), "Error");
        assert_eq!(type_tag::<Box<dyn std::error::Error>>(), "Box");
        assert_eq!(type_tag::<String>(), "String");
    }
}
