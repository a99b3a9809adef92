//! Find-and-copy / find-and-move jobs
//!
//! A job is built from raw per-invocation input ([`JobSettings`]) which is validated eagerly
//! into an immutable [`JobConfig`]. Running it lists the origin with the finder and hands the
//! result to the transfer engine.
//!
//! ```no_run
//! use common::job::{Job, JobSettings};
//! use common::transfer::Mode;
//!
//! let job = Job::new(JobSettings {
//!     origin: "/var/spool/reports".into(),
//!     destination: "/srv/archive".into(),
//!     pattern: r"\.csv$".to_string(),
//!     newermt: Some("2023-10-27".to_string()),
//!     mode: Mode::Move,
//!     ..Default::default()
//! })
//! .unwrap();
//! let summary = job.run().unwrap();
//! println!("{summary}");
//! ```

use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::Error;
use crate::find::{self, Criteria, MatchSet};
use crate::newermt;
use crate::pattern::{NamePattern, PatternSyntax};
use crate::transfer::{self, ConflictPolicy, Mode, Summary};

/// Unvalidated job input, as collected from the command line
#[derive(Debug, Clone, Default)]
pub struct JobSettings {
    pub origin: PathBuf,
    pub destination: PathBuf,
    pub pattern: String,
    pub syntax: PatternSyntax,
    pub extension: Option<String>,
    /// reference file or ISO date/datetime
    pub newermt: Option<String>,
    pub mode: Mode,
    pub on_conflict: ConflictPolicy,
    pub dry_run: bool,
    pub quiet: bool,
}

/// Validated, immutable job configuration
#[derive(Debug, Clone)]
pub struct JobConfig {
    origin: PathBuf,
    destination: PathBuf,
    criteria: Criteria,
    transfer: transfer::Settings,
}

impl JobConfig {
    /// Validate `settings`: the pattern compiles (checked before touching the filesystem),
    /// the origin is an existing directory, `newermt` resolves and the destination path can
    /// be determined. The destination itself is created later, by the transfer.
    #[instrument]
    pub fn new(settings: JobSettings) -> Result<Self, Error> {
        let pattern = NamePattern::compile(
            &settings.pattern,
            settings.syntax,
            settings.extension.as_deref(),
        )?;
        let origin = crate::path::absolute(&settings.origin)
            .map_err(|_| Error::OriginNotFound(settings.origin.clone()))?;
        if !origin.is_dir() {
            return Err(Error::OriginNotFound(origin));
        }
        let cutoff = settings
            .newermt
            .as_deref()
            .map(newermt::resolve)
            .transpose()?;
        let destination =
            crate::path::absolute(&settings.destination).map_err(|source| {
                Error::Destination {
                    path: settings.destination.clone(),
                    reason: "cannot determine the destination path".to_string(),
                    source: Some(source),
                }
            })?;
        Ok(Self {
            origin,
            destination,
            criteria: Criteria { pattern, cutoff },
            transfer: transfer::Settings {
                mode: settings.mode,
                on_conflict: settings.on_conflict,
                dry_run: settings.dry_run,
                quiet: settings.quiet,
            },
        })
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

}

/// Find matching files and transfer them.
///
/// Finder and transfer errors are returned unchanged. Per-file failures do not fail the job,
/// inspect [`Summary::failed`].
#[instrument(skip(config), fields(origin = ?config.origin, destination = ?config.destination))]
pub fn run(config: &JobConfig) -> Result<Summary, Error> {
    let matches = find::find_matches(&config.origin, &config.criteria)?;
    if matches.is_empty() {
        tracing::info!("no files matched {}", &config.criteria.pattern);
    }
    transfer::transfer(&matches, &config.destination, &config.transfer)
}

/// A configured, repeatable job
#[derive(Debug, Clone)]
pub struct Job {
    config: JobConfig,
}

impl Job {
    pub fn new(settings: JobSettings) -> Result<Self, Error> {
        Ok(Self::from_config(JobConfig::new(settings)?))
    }

    pub fn from_config(config: JobConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Only the selection step, nothing is transferred.
    pub fn find(&self) -> Result<MatchSet, Error> {
        find::find_matches(&self.config.origin, &self.config.criteria)
    }

    pub fn run(&self) -> Result<Summary, Error> {
        run(&self.config)
    }
}
