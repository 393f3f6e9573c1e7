//! Reading and layering of configuration.
//!
//! Options are resolved from the following layers, the first layer to set an
//! option wins:
//! - the command line and environment variables,
//! - the project config file [`PROJECT_CONFIG_FILE`] in the project root,
//! - the user config file `config.toml` in the `version-sync` sub directory of
//!   the user's config directory,
//! - the built in defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use version_sync_utils::result::{PathError, ResultEx, io_not_found};

/// The default path of the version file, relative to the project root.
pub const DEFAULT_VERSION_FILE: &str = "version";

/// The default path of the manifest, relative to the project root.
pub const DEFAULT_MANIFEST: &str = "lib/Cargo.toml";

/// The name of the project config file.
pub const PROJECT_CONFIG_FILE: &str = "version-sync.toml";

/// The sub directory within the user config directory.
pub const USER_CONFIG_SUB_DIRECTORY: &str = crate::TOOL_NAME;

/// A single layer of configuration, every option is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigLayer {
    /// The path of the file containing the version.
    pub version_file: Option<PathBuf>,

    /// The path of the manifest to update.
    pub manifest: Option<PathBuf>,

    /// Whether to replace the manifest atomically.
    pub atomic: Option<bool>,
}

impl ConfigLayer {
    /// Parses a config layer from a TOML document.
    ///
    /// # Example
    /// ```
    /// # use std::path::Path;
    /// # use version_sync_core::config::ConfigLayer;
    /// let layer = ConfigLayer::parse("manifest = \"Cargo.toml\"")?;
    /// assert_eq!(layer.manifest.as_deref(), Some(Path::new("Cargo.toml")));
    /// assert_eq!(layer.version_file, None);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reads a config layer from the given file, returns `None` if it doesn't
    /// exist.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ReadError> {
        fn inner(path: &Path) -> Result<Option<ConfigLayer>, ReadError> {
            let Some(content) = fs::read_to_string(path)
                .ignore(io_not_found)
                .path(path)?
            else {
                tracing::debug!(?path, "no config file");
                return Ok(None);
            };

            tracing::debug!(?path, "reading config file");
            let layer = ConfigLayer::parse(&content).map_err(|error| ReadError::Parsing {
                path: path.to_path_buf(),
                error,
            })?;

            Ok(Some(layer))
        }

        inner(path.as_ref())
    }

    /// Reads the project config file in the given project root.
    pub fn collect_project<P: AsRef<Path>>(root: P) -> Result<Option<Self>, ReadError> {
        Self::read(root.as_ref().join(PROJECT_CONFIG_FILE))
    }

    /// Reads the user config at its predefined location.
    ///
    /// The location used is [`dirs::config_dir()`].
    pub fn collect_user() -> Result<Option<Self>, ReadError> {
        let Some(config_dir) = dirs::config_dir() else {
            tracing::warn!("couldn't retrieve user config home");
            return Ok(None);
        };

        Self::read(
            config_dir
                .join(USER_CONFIG_SUB_DIRECTORY)
                .join("config.toml"),
        )
    }
}

/// The layered configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// The command line and environment variable layer.
    pub cli: Option<ConfigLayer>,

    /// The project config layer.
    pub project: Option<ConfigLayer>,

    /// The user config layer.
    pub user: Option<ConfigLayer>,
}

impl Config {
    /// Creates a new config with the given command line layer and no file
    /// layers.
    pub fn new(cli: Option<ConfigLayer>) -> Self {
        Self {
            cli,
            project: None,
            user: None,
        }
    }

    /// Returns the first value set by a layer, in order of precedence.
    fn get<T>(&self, f: impl Fn(&ConfigLayer) -> Option<&T>) -> Option<&T>
    where
        T: ?Sized,
    {
        [&self.cli, &self.project, &self.user]
            .into_iter()
            .flatten()
            .find_map(f)
    }

    /// The path of the version file, possibly relative to the project root.
    pub fn version_file(&self) -> &Path {
        self.get(|l| l.version_file.as_deref())
            .unwrap_or(Path::new(DEFAULT_VERSION_FILE))
    }

    /// The path of the manifest, possibly relative to the project root.
    pub fn manifest(&self) -> &Path {
        self.get(|l| l.manifest.as_deref())
            .unwrap_or(Path::new(DEFAULT_MANIFEST))
    }

    /// Whether to replace the manifest atomically, defaults to `false`.
    pub fn atomic(&self) -> bool {
        self.get(|l| l.atomic.as_ref()).copied().unwrap_or(false)
    }
}

/// Returned when reading a config file fails.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The TOML document could not be parsed.
    #[error("couldn't parse config file {path:?}")]
    Parsing {
        /// The path of the config file.
        path: PathBuf,

        /// The parsing error.
        #[source]
        error: toml::de::Error,
    },

    /// An IO error occurred.
    #[error("couldn't read config file")]
    Io(#[from] PathError<io::Error>),
}
