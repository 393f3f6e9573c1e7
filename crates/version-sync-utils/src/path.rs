//! Helper functions and types for paths.

use std::path::{Path, PathBuf};

/// Resolves `path` against `root` unless it is already absolute.
///
/// # Example
/// ```
/// # use std::path::Path;
/// # use version_sync_utils::path::resolve;
/// assert_eq!(resolve("/ci/repo", "lib/Cargo.toml"), Path::new("/ci/repo/lib/Cargo.toml"));
/// assert_eq!(resolve("/ci/repo", "/etc/version"), Path::new("/etc/version"));
/// ```
pub fn resolve<P: AsRef<Path>, Q: AsRef<Path>>(root: P, path: Q) -> PathBuf {
    fn inner(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    inner(root.as_ref(), path.as_ref())
}

/// Returns `path` relative to `root` if it is inside of it, otherwise `path`
/// itself. This is purely lexical.
///
/// # Example
/// ```
/// # use std::path::Path;
/// # use version_sync_utils::path::relative_to;
/// let root = Path::new("/ci/repo");
/// assert_eq!(relative_to(root, Path::new("/ci/repo/lib/Cargo.toml")), Path::new("lib/Cargo.toml"));
/// assert_eq!(relative_to(root, Path::new("/etc/version")), Path::new("/etc/version"));
/// ```
pub fn relative_to<'p>(root: &Path, path: &'p Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}
