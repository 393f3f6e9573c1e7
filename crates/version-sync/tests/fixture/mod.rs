#![allow(dead_code)]

use std::ffi::OsStr;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::process::ExitStatus;

use assert_cmd::Command;
#[expect(
    deprecated,
    reason = "cargo_bin is deprecated, cargo_bin! is not, see https://github.com/rust-lang/rust/issues/148426"
)]
use assert_cmd::cargo::cargo_bin;
use temp_dir::TempDir;
use version_sync_utils::fs::{TEMP_DIR_PREFIX, create_dir};

// NOTE: We don't do any fancy error handling here because this is exclusively
// used for tests.

/// The environment variables read by version-sync, these are cleared for
/// every run to not pick up the configuration of the machine running the
/// tests.
const ENV_VARS: &[&str] = &[
    "VERSION_SYNC_ROOT",
    "VERSION_SYNC_VERSION_FILE",
    "VERSION_SYNC_MANIFEST",
];

/// A manifest with a single version line.
pub const MANIFEST: &str = "\
[package]
name = \"foo\"
version = \"0.0.0\"
edition = \"2021\"
";

/// [`MANIFEST`] after syncing version `1.2.3`.
pub const MANIFEST_SYNCED: &str = "\
[package]
name = \"foo\"
version = \"1.2.3\"
edition = \"2021\"
";

/// A test environment in which to execute version-sync.
#[derive(Debug)]
pub struct Environment {
    dir: TempDir,
}

impl Environment {
    /// Creates a new empty test environment.
    pub fn new() -> Self {
        Self {
            dir: TempDir::with_prefix(TEMP_DIR_PREFIX).unwrap(),
        }
    }

    /// Creates a new test environment with a `version` file containing
    /// `1.2.3` and [`MANIFEST`] at `lib/Cargo.toml`.
    pub fn default_project() -> Self {
        let this = Self::new();
        this.write("version", "1.2.3\n");
        this.write("lib/Cargo.toml", MANIFEST);
        this
    }
}

impl Environment {
    /// The root of this environment.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The directory used as the user config directory.
    pub fn config_home(&self) -> PathBuf {
        self.root().join(".config")
    }

    /// Writes a file relative to the root, creating its parent directories.
    pub fn write<P: AsRef<Path>>(&self, path: P, content: impl AsRef<[u8]>) {
        let path = self.root().join(path);
        create_dir(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Reads a file relative to the root.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> String {
        std::fs::read_to_string(self.root().join(path)).unwrap()
    }
}

impl Environment {
    /// Creates a plain process command for version-sync running in the test
    /// environment, for tests which need control over its stdio.
    pub fn std_command(&self) -> process::Command {
        let mut cmd = process::Command::new(cargo_bin!("version-sync"));
        cmd.current_dir(self.root());
        cmd.env("XDG_CONFIG_HOME", self.config_home());
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Creates a command for version-sync running in the test environment.
    pub fn command(&self) -> Command {
        Command::from_std(self.std_command())
    }

    /// Runs version-sync in the test environment.
    pub fn run_version_sync_with<F>(&self, f: F) -> Run
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let mut cmd = self.command();

        f(&mut cmd);

        let output = cmd.output().unwrap();

        Run {
            output: Output::from_std_output(output, self.root()),
        }
    }

    /// Runs version-sync in the test environment with the given args.
    pub fn run_version_sync<I, T>(&self, args: I) -> Run
    where
        I: IntoIterator<Item = T>,
        T: AsRef<OsStr>,
    {
        self.run_version_sync_with(|cmd| cmd.args(args))
    }
}

/// The result of a run.
#[derive(Debug)]
pub struct Run {
    output: Output,
}

impl Run {
    /// The output of this run.
    pub fn output(&self) -> &Output {
        &self.output
    }
}

/// The output of running version-sync.
#[derive(Debug)]
pub struct Output {
    stdout: String,
    stderr: String,
    status: ExitStatus,
}

impl Output {
    /// Converts the output into UTF-8 and replaces
    /// - ASCII ESC bytes with `<ESC>` and
    /// - `dir` with `<TEMP_DIR>`.
    fn from_std_output(output: process::Output, dir: &Path) -> Self {
        fn convert_bytes(bytes: Vec<u8>, dir: &str) -> String {
            String::from_utf8(bytes)
                .unwrap()
                .replace("\u{1b}", "<ESC>")
                .replace(r"\", "/")
                .replace(dir, "<TEMP_DIR>")
        }

        let dir = dir.as_os_str().to_str().unwrap().replace(r"\", "/");

        Output {
            stdout: convert_bytes(output.stdout, &dir),
            stderr: convert_bytes(output.stderr, &dir),
            status: output.status,
        }
    }
}

impl Output {
    /// The exit status of the run.
    pub fn status(&self) -> ExitStatus {
        self.status
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status.code() {
            Some(code) => writeln!(f, "--- CODE: {code}")?,
            None => writeln!(f, "--- SIGNALED: This is most likely a bug!")?,
        }
        writeln!(f, "--- STDOUT:")?;
        writeln!(f, "{}", self.stdout)?;
        writeln!(f, "--- STDERR:")?;
        writeln!(f, "{}", self.stderr)?;
        writeln!(f, "--- END")?;

        Ok(())
    }
}
