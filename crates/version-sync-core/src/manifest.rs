//! Line based handling of manifest files.
//!
//! A manifest is not parsed, it is treated as a sequence of lines of which
//! only those starting with [`VERSION_PREFIX`] are of interest. Content is
//! kept as raw bytes, lines which aren't rewritten are passed through
//! unchanged, including their terminators.

use std::path::Path;
use std::{fs, io};

use crate::Version;

/// The prefix of lines which contain the version field.
///
/// This is matched literally at the very start of a line, indented lines or
/// lines with different spacing around `=` are not version lines.
pub const VERSION_PREFIX: &[u8] = b"version =";

/// Returns whether the given line is a version line.
///
/// # Example
/// ```
/// # use version_sync_core::manifest::is_version_line;
/// assert!(is_version_line(b"version = \"0.1.0\"\n"));
/// assert!(is_version_line(b"version = { workspace = true }"));
/// assert!(!is_version_line(b"  version = \"0.1.0\"\n"));
/// assert!(!is_version_line(b"version=\"0.1.0\"\n"));
/// assert!(!is_version_line(b"rust-version = \"1.89\"\n"));
/// ```
pub fn is_version_line(line: &[u8]) -> bool {
    line.starts_with(VERSION_PREFIX)
}

/// Returns the line which replaces a version line, always terminated by a
/// single `\n`.
///
/// # Example
/// ```
/// # use version_sync_core::{Version, manifest::version_line};
/// assert_eq!(version_line(&Version::new("1.2.3")), b"version = \"1.2.3\"\n");
/// ```
pub fn version_line(version: &Version) -> Vec<u8> {
    format!("version = \"{version}\"\n").into_bytes()
}

/// A manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Manifest {
    content: Vec<u8>,
}

impl Manifest {
    /// Creates a new manifest from its raw content.
    pub fn new<C: Into<Vec<u8>>>(content: C) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Reads the manifest at the given path.
    pub fn read<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fs::read(path).map(Self::new)
    }
}

impl Manifest {
    /// The raw content of this manifest.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Consumes this manifest and returns its raw content.
    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }

    /// Returns an iterator over the lines of this manifest, each line
    /// includes its terminator. The last line has no terminator if the
    /// manifest does not end with a newline.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.content.split_inclusive(|&b| b == b'\n')
    }

    /// Returns the number of version lines in this manifest.
    pub fn version_lines(&self) -> usize {
        self.lines().filter(|line| is_version_line(line)).count()
    }

    /// Replaces every version line with a line containing the given version
    /// and returns how many lines were replaced.
    ///
    /// # Example
    /// ```
    /// # use version_sync_core::{Manifest, Version};
    /// let mut manifest = Manifest::new("[package]\nversion = \"0.0.0\"\n");
    /// assert_eq!(manifest.set_version(&Version::new("1.2.3")), 1);
    /// assert_eq!(manifest.as_bytes(), b"[package]\nversion = \"1.2.3\"\n");
    /// ```
    pub fn set_version(&mut self, version: &Version) -> usize {
        let replacement = version_line(version);
        let mut rewritten = 0;
        let mut content = Vec::with_capacity(self.content.len());

        for (idx, line) in self.lines().enumerate() {
            if is_version_line(line) {
                tracing::trace!(line = idx + 1, "rewriting version line");
                content.extend_from_slice(&replacement);
                rewritten += 1;
            } else {
                content.extend_from_slice(line);
            }
        }

        self.content = content;
        rewritten
    }
}
