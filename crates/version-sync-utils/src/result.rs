//! Extensions for the [`Result`] type.

use std::error::Error;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use crate::private::Sealed;

/// An error with the path of the file it occurred on.
#[derive(Debug)]
pub struct PathError<E> {
    /// The path associated with the error.
    pub path: PathBuf,

    /// The inner error.
    pub error: E,
}

impl<E> PathError<E> {
    /// The path the failed operation was performed on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PathError<io::Error> {
    /// The kind of the inner IO error.
    pub fn kind(&self) -> io::ErrorKind {
        self.error.kind()
    }

    /// Whether the file this error refers to did not exist.
    pub fn is_not_found(&self) -> bool {
        io_not_found(&self.error)
    }
}

impl<E> Display for PathError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

impl<E> Error for PathError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Extensions for the [`Result`] type.
#[allow(private_bounds)]
pub trait ResultEx<T, E>: Sealed {
    /// Ignores the subset of the error for which the `check` returns true,
    /// returning `None` instead.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::fs;
    /// use version_sync_utils::result::{ResultEx, io_not_found};
    /// // a missing project config is not an error
    /// let config = fs::read_to_string("version-sync.toml").ignore(io_not_found)?;
    /// assert_eq!(config, None);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    fn ignore<F>(self, check: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&E) -> bool;

    /// Ignores the subset of the error for which the `check` returns true,
    /// returning `Default::default` instead.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::fs;
    /// use version_sync_utils::result::{ResultEx, io_not_found};
    /// // removing a file twice is fine
    /// fs::remove_file("lib/.Cargo.toml.tmp").ignore_default(io_not_found)?;
    /// fs::remove_file("lib/.Cargo.toml.tmp").ignore_default(io_not_found)?;
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    fn ignore_default<F>(self, check: F) -> Result<T, E>
    where
        T: Default,
        F: FnOnce(&E) -> bool;

    /// Attaches a path to this result in the error case.
    ///
    /// # Example
    /// ```no_run
    /// # use std::fs;
    /// use version_sync_utils::result::ResultEx;
    /// let version = fs::read_to_string("version").path("version")?;
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    fn path<P>(self, path: P) -> Result<T, PathError<E>>
    where
        P: Into<PathBuf>;

    /// Attaches a lazily computed path to this result in the error case.
    fn path_with<F>(self, f: F) -> Result<T, PathError<E>>
    where
        F: FnOnce() -> PathBuf;
}

impl<T, E> ResultEx<T, E> for Result<T, E> {
    fn ignore<F>(self, check: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&E) -> bool,
    {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(err) if check(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn ignore_default<F>(self, check: F) -> Result<T, E>
    where
        T: Default,
        F: FnOnce(&E) -> bool,
    {
        self.ignore(check).map(Option::unwrap_or_default)
    }

    fn path<P>(self, path: P) -> Result<T, PathError<E>>
    where
        P: Into<PathBuf>,
    {
        self.map_err(|error| PathError {
            path: path.into(),
            error,
        })
    }

    fn path_with<F>(self, f: F) -> Result<T, PathError<E>>
    where
        F: FnOnce() -> PathBuf,
    {
        self.map_err(|error| PathError { path: f(), error })
    }
}

/// A check for [`ResultEx`] methods which ignores [`io::ErrorKind::NotFound`].
pub fn io_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}
