//! File selection
//!
//! [`find_matches`] lists the immediate entries of an origin directory and keeps the regular
//! files whose name matches a [`NamePattern`] and, when a cutoff is set, whose modification
//! time is strictly newer than the cutoff. Nothing matching is a valid, empty result.
//!
//! [`find_unique`] is the strict counterpart: a plain substring lookup that must resolve to
//! exactly one file.

use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::Error;
use crate::newermt::Timestamp;
use crate::pattern::NamePattern;

/// Selection criteria applied to every candidate name
#[derive(Debug, Clone)]
pub struct Criteria {
    pub pattern: NamePattern,
    /// keep only files with mtime strictly greater than this
    pub cutoff: Option<Timestamp>,
}

/// A file that passed all filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    /// absolute path of the file
    pub path: PathBuf,
    pub modified: Timestamp,
    pub size: Option<u64>,
}

impl FileMatch {
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}

/// Matched files in directory listing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    matches: Vec<FileMatch>,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileMatch> {
        self.matches.iter()
    }
}

impl From<Vec<FileMatch>> for MatchSet {
    fn from(matches: Vec<FileMatch>) -> Self {
        Self { matches }
    }
}

impl IntoIterator for MatchSet {
    type Item = FileMatch;
    type IntoIter = std::vec::IntoIter<FileMatch>;
    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a FileMatch;
    type IntoIter = std::slice::Iter<'a, FileMatch>;
    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// Resolve `dir` to an absolute path and check it is a directory.
fn open_directory(dir: &Path) -> Result<PathBuf, Error> {
    let absolute = crate::path::absolute(dir).map_err(|_| Error::OriginNotFound(dir.into()))?;
    match std::fs::metadata(&absolute) {
        Ok(md) if md.is_dir() => Ok(absolute),
        _ => Err(Error::OriginNotFound(absolute)),
    }
}

/// Immediate entries of `dir` that are regular files (symlinks are followed), in listing
/// order. Entries that vanish or cannot be stat'ed while listing are skipped.
fn regular_files(dir: &Path) -> Result<Vec<(String, PathBuf, std::fs::Metadata)>, Error> {
    let entries = std::fs::read_dir(dir).map_err(|source| Error::Listing {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = vec![];
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!("failed reading an entry of {:?}: {}", dir, &error);
                continue;
            }
        };
        let path = entry.path();
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::debug!("skipping {:?}, cannot read metadata: {}", &path, &error);
                continue;
            }
        };
        if !metadata.is_file() {
            tracing::debug!("skipping {:?}, not a regular file", &path);
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, path, metadata));
    }
    Ok(files)
}

/// List `origin` (non-recursively) and return every file matching `criteria`.
#[instrument(skip(criteria), fields(pattern = %criteria.pattern))]
pub fn find_matches(origin: &Path, criteria: &Criteria) -> Result<MatchSet, Error> {
    let origin = open_directory(origin)?;
    let mut matches = vec![];
    for (name, path, metadata) in regular_files(&origin)? {
        if !criteria.pattern.matches(&name) {
            tracing::trace!("{:?} does not match", &name);
            continue;
        }
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(error) => {
                tracing::warn!("skipping {:?}, no modification time: {}", &path, &error);
                continue;
            }
        };
        if let Some(cutoff) = criteria.cutoff
            && modified <= cutoff
        {
            tracing::debug!("{:?} is not newer than the cutoff", &path);
            continue;
        }
        tracing::debug!("matched {:?}", &path);
        matches.push(FileMatch {
            path,
            modified,
            size: Some(metadata.len()),
        });
    }
    tracing::info!("found {} matching file(s) in {:?}", matches.len(), &origin);
    Ok(MatchSet::from(matches))
}

/// Return the one regular file in `directory` whose name contains `substring` (and ends with
/// `extension`, if given).
///
/// Fails with [`Error::NoMatch`] when nothing qualifies and with [`Error::AmbiguousMatch`],
/// listing all candidates sorted by path, when more than one does.
#[instrument]
pub fn find_unique(
    directory: &Path,
    substring: &str,
    extension: Option<&str>,
) -> Result<PathBuf, Error> {
    let directory = open_directory(directory)?;
    let extension = extension.filter(|ext| !ext.is_empty());
    let mut candidates: Vec<PathBuf> = regular_files(&directory)?
        .into_iter()
        .filter(|(name, _, _)| {
            name.contains(substring) && extension.is_none_or(|ext| name.ends_with(ext))
        })
        .map(|(_, path, _)| path)
        .collect();
    candidates.sort();
    match candidates.len() {
        0 => Err(Error::NoMatch {
            directory,
            substring: substring.to_string(),
            extension: extension.map(str::to_string),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(Error::AmbiguousMatch {
            directory,
            substring: substring.to_string(),
            candidates,
        }),
    }
}

/// Library entry point for the strict single-match lookup, see [`find_unique`].
pub fn get_target_file(
    directory: impl AsRef<Path>,
    substring: &str,
    extension: Option<&str>,
) -> Result<PathBuf, Error> {
    find_unique(directory.as_ref(), substring, extension)
}
