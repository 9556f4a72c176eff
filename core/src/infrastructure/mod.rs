//! Execution backends.
//!
//! `runner` holds the `CommandRunner` trait with its shell and mock
//! implementations; `fanout` drives a runner across every host of a
//! `HostSet` concurrently.

pub mod fanout;
pub mod runner;

pub use fanout::{ExecutionResult, FanOutExecutor, RemoteOutput};
pub use runner::{CommandRunner, ExecOutput, Invocation, MockRunner, ShellRunner};
