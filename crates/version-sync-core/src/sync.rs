//! Synchronizing the version of a version file into a manifest.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use version_sync_utils::fs;
use version_sync_utils::path::resolve;
use version_sync_utils::result::{PathError, ResultEx};

use crate::config::Config;
use crate::{Manifest, Version};

/// What to do with the rewritten manifest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Write the rewritten manifest back to its path.
    #[default]
    Write,

    /// Only check whether the manifest is already in sync, never write it.
    Check,

    /// Compute the rewritten manifest without writing it.
    DryRun,
}

/// How a manifest is written in [`Mode::Write`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteStrategy {
    /// Write a temporary file next to the manifest and rename it over the
    /// manifest, this requires the manifest's directory to be writable.
    Atomic,

    /// Truncate the manifest and write to it directly, a failed write may
    /// leave a truncated manifest behind.
    #[default]
    InPlace,
}

/// Synchronizes the version from a version file into a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSync {
    version_file: PathBuf,
    manifest: PathBuf,
    strategy: WriteStrategy,
}

impl VersionSync {
    /// Creates a new version sync for the given files, writing in place.
    pub fn new<V, M>(version_file: V, manifest: M) -> Self
    where
        V: Into<PathBuf>,
        M: Into<PathBuf>,
    {
        Self {
            version_file: version_file.into(),
            manifest: manifest.into(),
            strategy: WriteStrategy::default(),
        }
    }

    /// Creates a new version sync from a config, resolving relative paths
    /// against the given root.
    pub fn from_config<P: AsRef<Path>>(root: P, config: &Config) -> Self {
        let root = root.as_ref();

        Self::new(
            resolve(root, config.version_file()),
            resolve(root, config.manifest()),
        )
        .with_strategy(if config.atomic() {
            WriteStrategy::Atomic
        } else {
            WriteStrategy::InPlace
        })
    }

    /// Sets the write strategy.
    pub fn with_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl VersionSync {
    /// The path of the version file.
    pub fn version_file(&self) -> &Path {
        &self.version_file
    }

    /// The path of the manifest.
    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// The write strategy.
    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    /// Reads the version and the manifest, rewrites the manifest's version
    /// lines and handles the result according to `mode`.
    ///
    /// Reading happens fully before anything is written.
    pub fn run(&self, mode: Mode) -> Result<SyncReport, Error> {
        let _span = tracing::debug_span!("sync", ?mode).entered();

        tracing::debug!(path = ?self.version_file, "reading version");
        let version = Version::read(&self.version_file)
            .path_with(|| self.version_file.clone())
            .map_err(Error::ReadVersion)?;

        tracing::debug!(path = ?self.manifest, "reading manifest");
        let original = Manifest::read(&self.manifest)
            .path_with(|| self.manifest.clone())
            .map_err(Error::ReadManifest)?;

        let mut manifest = original.clone();
        let rewritten = manifest.set_version(&version);
        let changed = manifest != original;

        if rewritten == 0 {
            tracing::warn!(path = ?self.manifest, "manifest contains no version line");
        }
        tracing::debug!(%version, rewritten, changed, "rewrote manifest");

        let written = match mode {
            Mode::Write => {
                self.write(&manifest)?;
                true
            }
            Mode::Check | Mode::DryRun => false,
        };

        Ok(SyncReport {
            version,
            manifest,
            rewritten,
            changed,
            written,
        })
    }

    fn write(&self, manifest: &Manifest) -> Result<(), Error> {
        tracing::debug!(path = ?self.manifest, strategy = ?self.strategy, "writing manifest");

        match self.strategy {
            WriteStrategy::Atomic => fs::write_atomic(&self.manifest, manifest.as_bytes()),
            WriteStrategy::InPlace => fs::write_in_place(&self.manifest, manifest.as_bytes()),
        }
        .path_with(|| self.manifest.clone())
        .map_err(Error::WriteManifest)
    }
}

/// The outcome of a [`VersionSync::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    version: Version,
    manifest: Manifest,
    rewritten: usize,
    changed: bool,
    written: bool,
}

impl SyncReport {
    /// The version which was read.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The rewritten manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The number of version lines which were rewritten.
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    /// Whether the rewritten manifest differs from the one on disk before the
    /// run, i.e. whether it was out of sync.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Whether the manifest was written.
    pub fn written(&self) -> bool {
        self.written
    }
}

/// Returned by [`VersionSync::run`].
#[derive(Debug, Error)]
pub enum Error {
    /// The version file couldn't be read.
    #[error("couldn't read version file")]
    ReadVersion(#[source] PathError<io::Error>),

    /// The manifest couldn't be read.
    #[error("couldn't read manifest")]
    ReadManifest(#[source] PathError<io::Error>),

    /// The manifest couldn't be written.
    #[error("couldn't write manifest")]
    WriteManifest(#[source] PathError<io::Error>),
}

impl Error {
    /// The underlying IO error and the path it occurred on.
    pub fn path_error(&self) -> &PathError<io::Error> {
        match self {
            Self::ReadVersion(err) | Self::ReadManifest(err) | Self::WriteManifest(err) => err,
        }
    }
}
