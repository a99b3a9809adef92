//! Common library for the filesmith tools
//!
//! The tools select files in a directory by name pattern and recency, then copy or move them:
//!
//! - [`pattern`] compiles filename patterns (regex or glob) with an optional extension filter
//! - [`newermt`] turns a `--newermt` argument (reference file or ISO date) into a cutoff
//! - [`find`] lists a directory and applies both, or performs a strict single-match lookup
//! - [`transfer`] copies or moves a set of matches, with dry-run and conflict handling
//! - [`job`] validates a configuration and runs find + transfer as one unit
//!
//! [`run`] is the shared entry point of every binary: it installs logging, runs the tool body
//! and prints the summary.

use std::io::IsTerminal;

pub mod config;
pub mod error;
pub mod find;
pub mod job;
pub mod newermt;
pub mod path;
pub mod pattern;
pub mod transfer;

pub use config::OutputConfig;
pub use error::Error;
pub use find::{find_matches, find_unique, get_target_file};
pub use job::{Job, JobConfig, JobSettings};
pub use transfer::{ConflictPolicy, Mode};

fn init_tracing(output: &OutputConfig) {
    let filter = tracing_subscriber::EnvFilter::new(output.log_level().to_string());
    // a subscriber may already be installed (e.g. when called twice in one process)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

/// Run a tool body with logging configured from `output`.
///
/// Returns `None` if the body failed; the error has been logged and the caller is expected
/// to exit with a non-zero code.
pub fn run<Summary, E, Func>(output: OutputConfig, func: Func) -> Option<Summary>
where
    Summary: std::fmt::Display,
    E: Into<anyhow::Error>,
    Func: FnOnce() -> Result<Summary, E>,
{
    init_tracing(&output);
    match func() {
        Ok(summary) => {
            if output.show_summary() {
                println!("{}", &summary);
            }
            Some(summary)
        }
        Err(error) => {
            let error: anyhow::Error = error.into();
            tracing::error!("{:#}", &error);
            None
        }
    }
}
