//! Result aggregation and reporting.
//!
//! Everything here is a pure function of (command, results) except the two
//! `report_*` functions, which write the rendered text to caller-supplied
//! sinks. Informational lines go to `out`; the per-host failure digest goes
//! to `err`.
//!
//! A host counts as failed only when its result carries an error. Text on
//! stderr from a host that exited cleanly is ignored.
//!
//! Digest lines keep at most the first two lines of a host's output:
//!
//! ```text
//! sdw2 ==> line one
//! line two...
//! ```

use std::io::Write;

use tracing::debug;

use crate::command::{fill_counts, Command, MessageKind};
use crate::error::ClusterError;
use crate::infrastructure::fanout::ExecutionResult;


/// Appended to a digest line when the host's output had more than two lines.
pub const TRUNCATION_MARKER: &str = "...";


// ---------------------------------------------------------------------------
// AggregateOutcome
// ---------------------------------------------------------------------------

/// Summary of one fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOutcome {
    pub total_hosts: usize,
    pub failed_count: usize,
    /// One digest line per failed host, in topology order.
    pub failures: Vec<String>,
}

impl AggregateOutcome {
    pub fn succeeded(&self) -> bool {
        self.failed_count == 0
    }

    /// The summary line for this outcome.
    pub fn summary(&self, command: Command) -> String {
        if self.succeeded() {
            fill_counts(
                command.message(MessageKind::Success),
                &[self.total_hosts, self.total_hosts],
            )
        } else {
            fill_counts(
                command.message(MessageKind::Error),
                &[self.failed_count, self.total_hosts],
            )
        }
    }

    /// All failure lines joined into one block.
    pub fn digest(&self) -> String {
        self.failures.join("\n")
    }
}

/// Build the digest line for one host:
/// `<host> ==> <line 1>[\n<line 2>][...]`.
///
/// stderr is used when non-empty, stdout otherwise.
pub fn digest_line(result: &ExecutionResult) -> String {
    let source = if result.stderr.is_empty() {
        &result.stdout
    } else {
        &result.stderr
    };
    let mut lines = source.split('\n');
    let mut message = lines.next().unwrap_or_default().to_string();
    if let Some(second) = lines.next() {
        message.push('\n');
        message.push_str(second);
    }
    if lines.next().is_some() {
        message.push_str(TRUNCATION_MARKER);
    }
    format!("{} ==> {}", result.hostname, message)
}

/// Count failures and build digest lines, iterating in topology order
/// regardless of the order `results` arrived in.
pub fn aggregate(results: &[ExecutionResult]) -> AggregateOutcome {
    let mut ordered: Vec<&ExecutionResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.index);

    let failures: Vec<String> = ordered
        .iter()
        .filter(|r| r.failed())
        .map(|r| digest_line(r))
        .collect();

    AggregateOutcome {
        total_hosts: results.len(),
        failed_count: failures.len(),
        failures,
    }
}


// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// The pre-dispatch status line.
pub fn status_line(command: Command, host_count: usize) -> String {
    fill_counts(command.message(MessageKind::Status), &[host_count])
}

/// Write the status line to `out` and return it.
pub fn report_status<W: Write>(
    command: Command,
    host_count: usize,
    out: &mut W,
) -> Result<String, ClusterError> {
    let line = status_line(command, host_count);
    out.write_all(line.as_bytes())?;
    out.flush()?;
    Ok(line)
}

/// Write the outcome of a fan-out.
///
/// On full success the success line goes to `out` and the outcome is
/// returned. Otherwise the error line goes to `out`, the digest goes to
/// `err`, and a `RemoteExecution` error carrying the digest is returned.
pub fn report_outcome<O: Write, E: Write>(
    command: Command,
    results: &[ExecutionResult],
    out: &mut O,
    err: &mut E,
) -> Result<AggregateOutcome, ClusterError> {
    let outcome = aggregate(results);
    debug!(
        command = command.name(),
        total = outcome.total_hosts,
        failed = outcome.failed_count,
        "aggregated results"
    );

    out.write_all(outcome.summary(command).as_bytes())?;
    out.flush()?;
    if outcome.succeeded() {
        return Ok(outcome);
    }

    let digest = outcome.digest();
    writeln!(err, "{}", digest)?;
    err.flush()?;
    Err(ClusterError::RemoteExecution {
        failed: outcome.failed_count,
        total: outcome.total_hosts,
        digest,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, host: &str, stdout: &str, stderr: &str, error: Option<&str>) -> ExecutionResult {
        ExecutionResult {
            index,
            hostname: host.to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            error: error.map(str::to_string),
        }
    }

    fn all_fine() -> Vec<ExecutionResult> {
        vec![
            result(0, "mdw", "everything fine", "", None),
            result(1, "sdw1", "everything fine", "", None),
            result(2, "sdw2", "everything fine", "", None),
        ]
    }

    fn one_failed(stdout: &str, stderr: &str) -> Vec<ExecutionResult> {
        vec![
            result(0, "mdw", "everything fine", "", None),
            result(1, "sdw1", "everything fine", "", None),
            result(2, "sdw2", stdout, stderr, Some("some error")),
        ]
    }

    fn run(command: Command, results: &[ExecutionResult]) -> (String, String, Result<AggregateOutcome, ClusterError>) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let res = report_outcome(command, results, &mut out, &mut err);
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            res,
        )
    }

    // -- Success --

    #[test]
    fn all_hosts_succeed_for_every_command() {
        let expected = [
            (Command::Init, "PXF initialized successfully on 3 out of 3 hosts\n"),
            (Command::Start, "PXF started successfully on 3 out of 3 hosts\n"),
            (Command::Stop, "PXF stopped successfully on 3 out of 3 hosts\n"),
            (Command::Sync, "PXF configs synced successfully on 3 out of 3 hosts\n"),
            (Command::Restart, "PXF restarted successfully on 3 out of 3 hosts\n"),
            (Command::Status, "PXF is running on 3 out of 3 hosts\n"),
        ];
        for (command, line) in expected {
            let (out, err, res) = run(command, &all_fine());
            assert_eq!(out, line);
            assert!(err.is_empty());
            assert!(res.unwrap().succeeded());
        }
    }

    #[test]
    fn stderr_without_error_is_success() {
        let results = vec![
            result(0, "mdw", "typical stdout", "typical stderr", None),
            result(1, "sdw1", "typical stdout", "typical stderr", None),
            result(2, "sdw2", "typical stdout", "typical stderr", None),
        ];
        let (out, err, res) = run(Command::Stop, &results);
        assert_eq!(out, "PXF stopped successfully on 3 out of 3 hosts\n");
        assert!(err.is_empty());
        assert!(res.is_ok());
    }

    // -- Failure --

    #[test]
    fn failure_counts_are_failed_then_total() {
        let (out, err, res) = run(Command::Init, &one_failed("something wrong", "an error happened on sdw2"));
        assert_eq!(out, "PXF failed to initialize on 1 out of 3 hosts\n");
        assert_eq!(err, "sdw2 ==> an error happened on sdw2\n");
        match res {
            Err(ClusterError::RemoteExecution { failed, total, digest }) => {
                assert_eq!((failed, total), (1, 3));
                assert_eq!(digest, "sdw2 ==> an error happened on sdw2");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn error_lines_for_every_command() {
        let expected = [
            (Command::Start, "PXF failed to start on 1 out of 3 hosts\n"),
            (Command::Stop, "PXF failed to stop on 1 out of 3 hosts\n"),
            (Command::Sync, "PXF configs failed to sync on 1 out of 3 hosts\n"),
            (Command::Restart, "PXF failed to restart on 1 out of 3 hosts\n"),
            (Command::Status, "PXF is not running on 1 out of 3 hosts\n"),
        ];
        for (command, line) in expected {
            let (out, err, res) = run(command, &one_failed("", "an error happened on sdw2"));
            assert_eq!(out, line);
            assert_eq!(err, "sdw2 ==> an error happened on sdw2\n");
            assert!(res.is_err());
        }
    }

    #[test]
    fn error_value_message_is_digest() {
        let (_, _, res) = run(Command::Stop, &one_failed("", "boom"));
        assert_eq!(res.unwrap_err().to_string(), "sdw2 ==> boom");
    }

    // -- Digest lines --

    #[test]
    fn multiline_output_is_truncated_to_two_lines() {
        let (_, err, _) = run(
            Command::Stop,
            &one_failed("everything not fine", "line one\nline two\nline three"),
        );
        assert_eq!(err, "sdw2 ==> line one\nline two...\n");
    }

    #[test]
    fn many_extra_lines_get_a_single_marker() {
        let r = result(0, "sdw1", "", "a\nb\nc\nd\ne", Some("x"));
        assert_eq!(digest_line(&r), "sdw1 ==> a\nb...");
    }

    #[test]
    fn two_lines_are_kept_without_marker() {
        let r = result(0, "sdw1", "", "a\nb", Some("x"));
        assert_eq!(digest_line(&r), "sdw1 ==> a\nb");
    }

    #[test]
    fn trailing_newline_counts_as_a_line() {
        // "a\nb\n" splits into ["a", "b", ""], so the marker is added.
        let r = result(0, "sdw1", "", "a\nb\n", Some("x"));
        assert_eq!(digest_line(&r), "sdw1 ==> a\nb...");
    }

    #[test]
    fn empty_stderr_falls_back_to_stdout() {
        let (_, err, _) = run(Command::Stop, &one_failed("wrong\nline2\nline3", ""));
        assert_eq!(err, "sdw2 ==> wrong\nline2...\n");
    }

    #[test]
    fn no_output_at_all() {
        let r = result(0, "sdw1", "", "", Some("exit status 1"));
        assert_eq!(digest_line(&r), "sdw1 ==> ");
    }

    // -- Ordering --

    #[test]
    fn digest_follows_topology_order_not_arrival_order() {
        let results = vec![
            result(2, "sdw3", "", "third", Some("e")),
            result(0, "sdw1", "", "first", Some("e")),
            result(1, "sdw2", "fine", "", None),
        ];
        let outcome = aggregate(&results);
        assert_eq!(outcome.failed_count, 2);
        assert_eq!(outcome.total_hosts, 3);
        assert_eq!(outcome.digest(), "sdw1 ==> first\nsdw3 ==> third");
    }

    #[test]
    fn reporting_is_idempotent() {
        let results = one_failed("", "line one\nline two\nline three");
        let first = run(Command::Start, &results);
        let second = run(Command::Start, &results);
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    // -- Status --

    #[test]
    fn status_lines() {
        assert_eq!(status_line(Command::Init, 2), "Initializing PXF on master and 2 segment hosts...\n");
        assert_eq!(status_line(Command::Start, 2), "Starting PXF on 2 segment hosts...\n");
        assert_eq!(status_line(Command::Stop, 2), "Stopping PXF on 2 segment hosts...\n");
        assert_eq!(status_line(Command::Sync, 2), "Syncing PXF configuration files to 2 hosts...\n");
    }

    #[test]
    fn report_status_writes_line() {
        let mut out = Vec::new();
        let line = report_status(Command::Restart, 5, &mut out).unwrap();
        assert_eq!(line, "Restarting PXF on 5 segment hosts...\n");
        assert_eq!(String::from_utf8(out).unwrap(), line);
    }
}
