use std::io::Write;
use std::path::{Path, PathBuf};
use std::{env, io};

use color_eyre::eyre;
use color_eyre::eyre::WrapErr;
use thiserror::Error;
use version_sync_core::Version;
use version_sync_core::config::{Config, ConfigLayer, ReadError};
use version_sync_core::sync::Error as SyncError;
use version_sync_utils::path::relative_to;

use crate::ui::{self, Ui};

pub mod options;
pub mod sync;

/// version-sync exited successfully.
pub const EXIT_OK: u8 = 0;

/// The manifest was out of sync in check mode.
pub const EXIT_CHECK_FAILURE: u8 = 1;

/// The requested operation failed gracefully.
pub const EXIT_OPERATION_FAILURE: u8 = 2;

/// An unexpected error occurred.
pub const EXIT_ERROR: u8 = 3;

/// A graceful error.
#[derive(Debug, Error)]
#[error("an operation failed")]
pub struct OperationFailure;

/// A check failure.
#[derive(Debug, Error)]
#[error("the manifest is out of sync")]
pub struct CheckFailure;

pub struct Context<'a> {
    /// The parsed top-level arguments.
    pub args: &'a options::CliArguments,

    /// The terminal ui.
    pub ui: &'a Ui,
}

impl<'a> Context<'a> {
    pub fn new(args: &'a options::CliArguments, ui: &'a Ui) -> Self {
        Self { args, ui }
    }
}

impl Context<'_> {
    pub fn error_root_not_found(&self, root: &Path) -> io::Result<()> {
        let mut w = self.ui.error()?;
        write!(w, "Root ")?;
        ui::write_path(&mut w, root)?;
        writeln!(w, " not found")
    }

    pub fn error_config(&self, root: &Path, error: &ReadError) -> io::Result<()> {
        let mut w = self.ui.error()?;
        match error {
            ReadError::Parsing { path, error } => {
                write!(w, "Couldn't parse config file ")?;
                ui::write_path(&mut w, relative_to(root, path))?;
                writeln!(w, ":\n{}", error.to_string().trim_end())
            }
            ReadError::Io(error) => {
                write!(w, "Couldn't read config file ")?;
                ui::write_path(&mut w, relative_to(root, error.path()))?;
                writeln!(w, ":\n{}", error.error)
            }
        }
    }

    pub fn error_sync(&self, root: &Path, error: &SyncError) -> io::Result<()> {
        let (what, flag) = match error {
            SyncError::ReadVersion(_) => ("Version file", "--version-file <path>"),
            SyncError::ReadManifest(_) | SyncError::WriteManifest(_) => {
                ("Manifest", "--manifest <path>")
            }
        };

        let path_error = error.path_error();
        let path = relative_to(root, path_error.path());

        if path_error.is_not_found() && !matches!(error, SyncError::WriteManifest(_)) {
            let mut w = self.ui.error()?;
            write!(w, "{what} ")?;
            ui::write_path(&mut w, path)?;
            writeln!(w, " not found")?;
            drop(w);

            let mut w = self.ui.hint()?;
            write!(w, "You can pass the {} using ", what.to_lowercase())?;
            ui::write_flag(&mut w, flag)?;
            return writeln!(w);
        }

        let verb = match error {
            SyncError::WriteManifest(_) => "write",
            _ => "read",
        };

        let mut w = self.ui.error()?;
        write!(w, "Couldn't {verb} {} ", what.to_lowercase())?;
        ui::write_path(&mut w, path)?;
        writeln!(w, ":\n{}", path_error.error)
    }

    pub fn error_out_of_sync(
        &self,
        root: &Path,
        manifest: &Path,
        version: &Version,
    ) -> io::Result<()> {
        let mut w = self.ui.error()?;
        write!(w, "Manifest ")?;
        ui::write_path(&mut w, relative_to(root, manifest))?;
        writeln!(w, " is out of sync with version {version}")?;
        drop(w);

        let mut w = self.ui.hint()?;
        write!(w, "Run ")?;
        ui::write_flag(&mut w, "version-sync")?;
        write!(w, " without ")?;
        ui::write_flag(&mut w, "--check")?;
        writeln!(w, " to update it")
    }

    pub fn run(&mut self) -> eyre::Result<()> {
        sync::run(self)
    }
}

impl Context<'_> {
    /// Resolve the current root.
    pub fn root(&self) -> eyre::Result<PathBuf> {
        Ok(match &self.args.root {
            Some(root) => {
                if !root.try_exists()? {
                    self.error_root_not_found(root)?;
                    eyre::bail!(OperationFailure);
                }

                root.canonicalize()?
            }
            None => env::current_dir().wrap_err("reading PWD")?,
        })
    }

    /// Resolve the config layers for the given root.
    pub fn config(&self, root: &Path) -> eyre::Result<Config> {
        let mut config = Config::new(Some(self.args.config_layer()));

        let layers = ConfigLayer::collect_project(root)
            .and_then(|project| Ok((project, ConfigLayer::collect_user()?)));

        match layers {
            Ok((project, user)) => {
                config.project = project;
                config.user = user;
            }
            Err(err) => {
                self.error_config(root, &err)?;
                eyre::bail!(OperationFailure);
            }
        }

        tracing::debug!(?config, "resolved config");
        Ok(config)
    }
}
