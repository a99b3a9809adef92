//! Error taxonomy shared by the finder, the transfer engine and jobs.
//!
//! Each variant is a distinct failure kind so callers can branch on it. Per-file transfer
//! failures are NOT represented here: they are recovered locally and recorded in
//! [`crate::transfer::Summary::failed`].
//!
//! # Logging Convention
//! The underlying cause is kept as `#[source]`, log with `{:#}` to show the full chain:
//! ```ignore
//! tracing::error!("job failed: {:#}", anyhow::Error::from(error));
//! ```

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The filename pattern failed to compile. Raised before any filesystem access.
    #[error("invalid pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The origin (or lookup directory) is missing or is not a directory.
    #[error("origin {0:?} does not exist or is not a directory")]
    OriginNotFound(PathBuf),

    /// The origin exists but could not be listed.
    #[error("cannot open directory {path:?} for reading")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `--newermt` is neither an existing file nor an ISO date/datetime.
    #[error("--newermt value is not a valid file or ISO date/datetime: {0}")]
    InvalidTimeFilter(String),

    /// The destination could not be created or is not a directory.
    #[error("destination {path:?} cannot be used: {reason}")]
    Destination {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Strict lookup found nothing.
    #[error("no file found with key={substring:?}{} in {directory:?}", extension_note(.extension))]
    NoMatch {
        directory: PathBuf,
        substring: String,
        extension: Option<String>,
    },

    /// Strict lookup found more than one candidate.
    #[error(
        "multiple files found with key={substring:?} in {directory:?}:\n{}",
        list_candidates(.candidates)
    )]
    AmbiguousMatch {
        directory: PathBuf,
        substring: String,
        candidates: Vec<PathBuf>,
    },
}

fn extension_note(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!(" and extension={ext:?}"),
        None => String::new(),
    }
}

fn list_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, Error>;
