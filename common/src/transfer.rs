use std::collections::BTreeMap;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::Error;
use crate::find::{FileMatch, MatchSet};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Copy,
    Move,
}

impl Mode {
    fn verb(self) -> &'static str {
        match self {
            Mode::Copy => "copy",
            Mode::Move => "move",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Mode::Copy => "copied",
            Mode::Move => "moved",
        }
    }
}

/// What to do when the destination already has a file with the same name
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictPolicy {
    /// last writer wins
    #[default]
    Overwrite,
    /// keep the existing destination file
    Skip,
    /// record the file as failed and continue
    Error,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Settings {
    pub mode: Mode,
    pub on_conflict: ConflictPolicy,
    pub dry_run: bool,
    pub quiet: bool,
}

/// Outcome of one transfer run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// counts below describe what WOULD have happened
    pub dry_run: bool,
    pub files_copied: usize,
    pub files_moved: usize,
    pub files_skipped: usize,
    pub bytes_transferred: u64,
    /// source path -> kind of the I/O error that stopped it
    pub failed: BTreeMap<PathBuf, std::io::ErrorKind>,
    /// (source, destination) of every transfer performed or planned, in processing order
    pub operations: Vec<(PathBuf, PathBuf)>,
}

impl Summary {
    pub fn files_transferred(&self) -> usize {
        self.files_copied + self.files_moved
    }

    pub fn files_failed(&self) -> usize {
        self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl std::ops::Add for Summary {
    type Output = Self;
    fn add(mut self, other: Self) -> Self {
        self.dry_run |= other.dry_run;
        self.files_copied += other.files_copied;
        self.files_moved += other.files_moved;
        self.files_skipped += other.files_skipped;
        self.bytes_transferred += other.bytes_transferred;
        self.failed.extend(other.failed);
        self.operations.extend(other.operations);
        self
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.dry_run {
            writeln!(f, "dry run, no files were changed")?;
        }
        write!(
            f,
            "files copied: {}\n\
            files moved: {}\n\
            files skipped: {}\n\
            files failed: {}\n\
            bytes transferred: {}\n",
            self.files_copied,
            self.files_moved,
            self.files_skipped,
            self.files_failed(),
            bytesize::ByteSize(self.bytes_transferred),
        )?;
        for (path, kind) in &self.failed {
            writeln!(f, "  failed {:?}: {}", path, kind)?;
        }
        Ok(())
    }
}

fn report(settings: &Settings, msg: std::fmt::Arguments) {
    if !settings.quiet {
        println!("{msg}");
    }
}

fn is_same_file(md1: &std::fs::Metadata, md2: &std::fs::Metadata) -> bool {
    md1.dev() == md2.dev() && md1.ino() == md2.ino()
}

/// Make sure `destination` is a usable directory, creating it (and parents) when missing.
///
/// In dry-run mode a missing destination is only reported.
#[instrument]
pub fn ensure_destination(destination: &Path, settings: &Settings) -> Result<PathBuf, Error> {
    let destination =
        crate::path::absolute(destination).map_err(|source| Error::Destination {
            path: destination.to_path_buf(),
            reason: "cannot determine the destination path".to_string(),
            source: Some(source),
        })?;
    match std::fs::metadata(&destination) {
        Ok(md) if md.is_dir() => return Ok(destination),
        Ok(_) => {
            return Err(Error::Destination {
                path: destination,
                reason: "not a directory".to_string(),
                source: None,
            });
        }
        Err(error) if error.kind() != std::io::ErrorKind::NotFound => {
            return Err(Error::Destination {
                path: destination,
                reason: "cannot read metadata".to_string(),
                source: Some(error),
            });
        }
        Err(_) => {}
    }
    if settings.dry_run {
        tracing::info!("destination {:?} does not exist", &destination);
        report(
            settings,
            format_args!("would create directory {:?}", &destination),
        );
        return Ok(destination);
    }
    tracing::info!("creating destination {:?}", &destination);
    std::fs::create_dir_all(&destination).map_err(|source| Error::Destination {
        path: destination.clone(),
        reason: "cannot create directory".to_string(),
        source: Some(source),
    })?;
    Ok(destination)
}

/// Copy contents and permissions, then access and modification times.
fn copy_file(src: &Path, dst: &Path) -> std::io::Result<u64> {
    let bytes = std::fs::copy(src, dst)?;
    let src_metadata = std::fs::metadata(src)?;
    filetime::set_file_times(
        dst,
        filetime::FileTime::from_last_access_time(&src_metadata),
        filetime::FileTime::from_last_modification_time(&src_metadata),
    )?;
    Ok(bytes)
}

/// Rename, falling back to copy + remove when crossing filesystems.
fn move_file(src: &Path, dst: &Path) -> std::io::Result<u64> {
    move_file_with(src, dst, rename)
}

fn rename(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::rename(src, dst)
}

fn move_file_with(
    src: &Path,
    dst: &Path,
    try_rename: impl FnOnce(&Path, &Path) -> std::io::Result<()>,
) -> std::io::Result<u64> {
    let size = std::fs::symlink_metadata(src)?.len();
    match try_rename(src, dst) {
        Ok(()) => Ok(size),
        Err(error) if error.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!("{:?} is on another filesystem, copying instead", dst);
            let bytes = copy_file(src, dst)?;
            std::fs::remove_file(src)?;
            Ok(bytes)
        }
        Err(error) => Err(error),
    }
}

enum Outcome {
    Transferred(u64),
    Planned,
    Skipped,
}

fn transfer_one(
    file_match: &FileMatch,
    dst: &Path,
    settings: &Settings,
) -> std::io::Result<Outcome> {
    let src = file_match.path.as_path();
    if let Ok(dst_metadata) = std::fs::symlink_metadata(dst) {
        if dst_metadata.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::IsADirectory,
                format!("destination {dst:?} is a directory"),
            ));
        }
        // copying a file onto itself would truncate it
        if let Ok(src_metadata) = std::fs::metadata(src)
            && let Ok(dst_target) = std::fs::metadata(dst)
            && is_same_file(&src_metadata, &dst_target)
        {
            tracing::debug!("{:?} and {:?} are the same file", src, dst);
            return Ok(Outcome::Skipped);
        }
        match settings.on_conflict {
            ConflictPolicy::Overwrite => {
                tracing::debug!("{:?} exists, overwriting", dst);
            }
            ConflictPolicy::Skip => {
                tracing::debug!("{:?} exists, skipping", dst);
                return Ok(Outcome::Skipped);
            }
            ConflictPolicy::Error => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("destination {dst:?} already exists"),
                ));
            }
        }
    }
    if settings.dry_run {
        return Ok(Outcome::Planned);
    }
    let bytes = match settings.mode {
        Mode::Copy => copy_file(src, dst)?,
        Mode::Move => move_file(src, dst)?,
    };
    Ok(Outcome::Transferred(bytes))
}

/// Copy or move every file of `matches` into `destination`, keeping file names.
///
/// A failure on one file is recorded in [`Summary::failed`] and never stops the batch. Only
/// an unusable destination aborts, before any file is touched.
#[instrument(skip(matches), fields(files = matches.len()))]
pub fn transfer(
    matches: &MatchSet,
    destination: &Path,
    settings: &Settings,
) -> Result<Summary, Error> {
    let destination = ensure_destination(destination, settings)?;
    let mut summary = Summary {
        dry_run: settings.dry_run,
        ..Default::default()
    };
    for file_match in matches {
        let src = &file_match.path;
        let Some(name) = file_match.file_name() else {
            tracing::warn!("{:?} has no file name, skipping", src);
            summary
                .failed
                .insert(src.clone(), std::io::ErrorKind::InvalidInput);
            continue;
        };
        let dst = destination.join(name);
        match transfer_one(file_match, &dst, settings) {
            Ok(Outcome::Transferred(bytes)) => {
                tracing::info!("{} {:?} -> {:?}", settings.mode.past_tense(), src, &dst);
                report(
                    settings,
                    format_args!("{} {:?} -> {:?}", settings.mode.past_tense(), src, &dst),
                );
                summary.bytes_transferred += bytes;
                summary.operations.push((src.clone(), dst));
                match settings.mode {
                    Mode::Copy => summary.files_copied += 1,
                    Mode::Move => summary.files_moved += 1,
                }
            }
            Ok(Outcome::Planned) => {
                report(
                    settings,
                    format_args!("would {} {:?} -> {:?}", settings.mode.verb(), src, &dst),
                );
                summary.bytes_transferred += file_match.size.unwrap_or(0);
                summary.operations.push((src.clone(), dst));
                match settings.mode {
                    Mode::Copy => summary.files_copied += 1,
                    Mode::Move => summary.files_moved += 1,
                }
            }
            Ok(Outcome::Skipped) => {
                let prefix = if settings.dry_run { "would skip" } else { "skipped" };
                report(settings, format_args!("{} {:?}", prefix, src));
                summary.files_skipped += 1;
            }
            Err(error) => {
                tracing::warn!(
                    "{} {:?} -> {:?} failed: {}",
                    settings.mode.verb(),
                    src,
                    &dst,
                    &error
                );
                summary.failed.insert(src.clone(), error.kind());
            }
        }
    }
    Ok(summary)
}
