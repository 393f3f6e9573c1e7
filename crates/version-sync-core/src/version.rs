//! The version identifier read from a version file.

use std::fmt::{self, Display};
use std::path::Path;
use std::{fs, io};

/// A version identifier.
///
/// This is the content of a version file with surrounding whitespace removed,
/// no validation of its syntax is performed, any content is a valid version,
/// including the empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Creates a new version from the raw content of a version file, stripping
    /// surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// # use version_sync_core::Version;
    /// assert_eq!(Version::new("  1.2.3\n").as_str(), "1.2.3");
    /// assert_eq!(Version::new("v2.0.0-rc.1\r\n").as_str(), "v2.0.0-rc.1");
    /// ```
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    /// Reads the version from the file at the given path.
    pub fn read<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fn inner(path: &Path) -> io::Result<Version> {
            let raw = fs::read_to_string(path)?;
            let version = Version::new(&raw);

            if version.is_empty() {
                tracing::warn!(?path, "version file is empty");
            }

            Ok(version)
        }

        inner(path.as_ref())
    }
}

impl Version {
    /// The version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the version file contained only whitespace.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
