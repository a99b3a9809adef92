use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to `$HOME`.
///
/// `~user` forms are left untouched, as is everything when `HOME` is not set.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Expand `~` and make the path absolute relative to the current directory.
///
/// The path is not canonicalized: symlinks in it are kept as given.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(expand_tilde(path))
}
