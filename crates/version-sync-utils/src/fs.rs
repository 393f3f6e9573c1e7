//! Helper functions and types for filesystem interactions, including unit test
//! helpers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use temp_dir::TempDir;
use tempfile::NamedTempFile;

use crate::result::{ResultEx, io_not_found};

/// The prefix used for temporary directories in [`TempTestEnv`].
pub const TEMP_DIR_PREFIX: &str = "version-sync";

/// Creates a new directory and its parent directories, but doesn't fail if it
/// already exists.
pub fn create_dir<P>(path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fn inner(path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).ignore_default(|e| e.kind() == io::ErrorKind::AlreadyExists)
    }

    inner(path.as_ref())
}

/// Truncates the file at `path` and writes `content` to it.
///
/// Symlinks at `path` are followed and the file keeps its identity, links and
/// ownership. The writer is flushed before returning, if this fails the file
/// may be left truncated or partially written. See [`write_atomic`] for a
/// write which can't leave a partial file behind.
pub fn write_in_place<P>(path: P, content: &[u8]) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fn inner(path: &Path, content: &[u8]) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        w.write_all(content)?;
        w.into_inner().map_err(io::IntoInnerError::into_error)?.sync_all()
    }

    inner(path.as_ref(), content)
}

/// Replaces the file at `path` with `content` by writing a temporary file in
/// the same directory and renaming it over the original.
///
/// Symlinks at `path` are resolved first, so the file they point to is
/// replaced and the link is kept. The directory containing the file must be
/// writable. The permissions of an existing file are carried over. If any step
/// fails the temporary file is removed and the original is left untouched.
///
/// # Example
/// ```no_run
/// # use version_sync_utils::fs::write_atomic;
/// write_atomic("lib/Cargo.toml", b"[package]\nversion = \"1.2.3\"\n")?;
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn write_atomic<P>(path: P, content: &[u8]) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fn inner(path: &Path, content: &[u8]) -> io::Result<()> {
        let target = fs::canonicalize(path)
            .ignore(io_not_found)?
            .unwrap_or_else(|| path.to_path_buf());

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // removed on drop unless persisted
        let mut temp = NamedTempFile::new_in(dir)?;
        tracing::trace!(?path, ?target, temp = ?temp.path(), "writing through temporary file");

        temp.write_all(content)?;
        temp.as_file().sync_all()?;

        if let Some(meta) = fs::metadata(&target).ignore(io_not_found)? {
            temp.as_file().set_permissions(meta.permissions())?;
        }

        temp.persist(&target).map_err(|err| err.error)?;
        Ok(())
    }

    inner(path.as_ref(), content)
}

/// Creates a temporary test environment in which files and directories can be
/// prepared and checked against after the test ran.
#[derive(Debug)]
pub struct TempTestEnv {
    root: TempDir,
    found: BTreeMap<PathBuf, Option<Vec<u8>>>,
    expected: BTreeMap<PathBuf, Option<Option<Vec<u8>>>>,
}

/// Set up the directory structure.
///
/// See [`TempTestEnv::run`] and [`TempTestEnv::run_no_check`].
pub struct Setup(TempTestEnv);

impl Setup {
    /// Create a directory and all its parents within the test root.
    ///
    /// May panic if io errors are encountered.
    pub fn setup_dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        create_dir(self.0.root.path().join(path)).unwrap();
        self
    }

    /// Create a file and all its parent directories within the test root.
    ///
    /// May panic if io errors are encountered.
    pub fn setup_file<P: AsRef<Path>>(&mut self, path: P, content: impl AsRef<[u8]>) -> &mut Self {
        let abs_path = self.0.root.path().join(path);
        if let Some(parent) = abs_path.parent() {
            create_dir(parent).unwrap();
        }

        fs::write(&abs_path, content).unwrap();
        self
    }
}

/// Specify what you expect to see after the test concluded.
///
/// See [`TempTestEnv::run`].
pub struct Expect(TempTestEnv);

impl Expect {
    /// Ensure a directory exists after a test ran.
    pub fn expect_dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.0.add_expected(path.as_ref().to_path_buf(), None);
        self
    }

    /// Ensure a file exists after a test ran, regardless of its content.
    pub fn expect_file<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.0.add_expected(path.as_ref().to_path_buf(), Some(None));
        self
    }

    /// Ensure a file with the given content exists after a test ran.
    pub fn expect_file_content<P: AsRef<Path>>(
        &mut self,
        path: P,
        content: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.0.add_expected(
            path.as_ref().to_path_buf(),
            Some(Some(content.as_ref().to_owned())),
        );
        self
    }
}

impl TempTestEnv {
    /// Create a test environment and run the given test in it.
    ///
    /// The given closures for `setup` and `expect` set up the test environment
    /// and configure the expected end state respectively. Any file or
    /// directory found which was not expected fails the test.
    pub fn run(
        setup: impl FnOnce(&mut Setup) -> &mut Setup,
        test: impl FnOnce(&Path),
        expect: impl FnOnce(&mut Expect) -> &mut Expect,
    ) {
        let dir = Self::new();

        let mut s = Setup(dir);
        setup(&mut s);
        let Setup(dir) = s;

        test(dir.root.path());

        let mut e = Expect(dir);
        expect(&mut e);
        let Expect(mut dir) = e;

        dir.collect();
        dir.assert();
    }

    /// Create a test environment and run the given test in it.
    ///
    /// This is the same as [`TempTestEnv::run`], but does not check the
    /// resulting directory structure.
    pub fn run_no_check(setup: impl FnOnce(&mut Setup) -> &mut Setup, test: impl FnOnce(&Path)) {
        let mut s = Setup(Self::new());
        setup(&mut s);
        let Setup(dir) = s;

        test(dir.root.path());
    }
}

impl TempTestEnv {
    fn new() -> Self {
        Self {
            root: TempDir::with_prefix(TEMP_DIR_PREFIX).unwrap(),
            found: BTreeMap::new(),
            expected: BTreeMap::new(),
        }
    }

    fn add_expected(&mut self, expected: PathBuf, content: Option<Option<Vec<u8>>>) {
        for ancestor in expected.ancestors() {
            self.expected.insert(ancestor.to_path_buf(), None);
        }
        self.expected.insert(expected, content);
    }

    fn add_found(&mut self, found: PathBuf, content: Option<Vec<u8>>) {
        for ancestor in found.ancestors() {
            self.found.insert(ancestor.to_path_buf(), None);
        }
        self.found.insert(found, content);
    }

    fn read(&mut self, path: PathBuf) {
        let rel = path.strip_prefix(self.root.path()).unwrap().to_path_buf();
        if path.metadata().unwrap().is_file() {
            let content = fs::read(&path).unwrap();
            self.add_found(rel, Some(content));
        } else {
            let mut empty = true;
            for entry in path.read_dir().unwrap() {
                self.read(entry.unwrap().path());
                empty = false;
            }

            if empty && self.root.path() != path {
                self.add_found(rel, None);
            }
        }
    }

    fn collect(&mut self) {
        self.read(self.root.path().to_path_buf())
    }

    fn assert(mut self) {
        let mut not_found = BTreeSet::new();
        let mut not_matched = BTreeMap::new();
        for (expected_path, expected_value) in self.expected {
            let Some(found) = self.found.remove(&expected_path) else {
                not_found.insert(expected_path);
                continue;
            };

            if let Some(Some(expected)) = expected_value {
                let found = found.unwrap_or_default();
                if expected != found {
                    not_matched.insert(expected_path, (found, expected));
                }
            }
        }

        // the root itself is always found
        self.found.remove(Path::new(""));
        let not_expected: BTreeSet<_> = self.found.into_keys().collect();

        let mut msg = String::new();
        if !not_found.is_empty() {
            writeln!(&mut msg, "\n=== Not found ===").unwrap();
            for path in &not_found {
                writeln!(&mut msg, "/{}", path.display()).unwrap();
            }
        }

        if !not_expected.is_empty() {
            writeln!(&mut msg, "\n=== Not expected ===").unwrap();
            for path in &not_expected {
                writeln!(&mut msg, "/{}", path.display()).unwrap();
            }
        }

        if !not_matched.is_empty() {
            writeln!(&mut msg, "\n=== Content mismatch ===").unwrap();
            for (path, (found, expected)) in &not_matched {
                writeln!(&mut msg, "/{}", path.display()).unwrap();
                writeln!(
                    &mut msg,
                    "=== Expected ===\n>>>\n{}\n<<<\n",
                    String::from_utf8_lossy(expected)
                )
                .unwrap();
                writeln!(
                    &mut msg,
                    "=== Found ===\n>>>\n{}\n<<<\n",
                    String::from_utf8_lossy(found)
                )
                .unwrap();
            }
        }

        if !msg.is_empty() {
            panic!("{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_env_run() {
        TempTestEnv::run(
            |test| {
                test.setup_file("lib/Cargo.toml", "version = \"0.0.0\"\n")
                    .setup_file("version", "1.2.3\n")
            },
            |root| {
                fs::remove_file(root.join("version")).unwrap();
            },
            |test| test.expect_file_content("lib/Cargo.toml", "version = \"0.0.0\"\n"),
        );
    }

    #[test]
    #[should_panic]
    fn test_temp_env_run_panic() {
        TempTestEnv::run(
            |test| test.setup_file("version", "1.2.3\n"),
            |_| {},
            |test| test.expect_file_content("version", "1.2.4\n"),
        );
    }

    #[test]
    fn test_write_in_place() {
        TempTestEnv::run(
            |test| test.setup_file("lib/Cargo.toml", "a much longer previous content\n"),
            |root| {
                write_in_place(root.join("lib/Cargo.toml"), b"short\n").unwrap();
            },
            |test| test.expect_file_content("lib/Cargo.toml", "short\n"),
        );
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        TempTestEnv::run(
            |test| test.setup_file("lib/Cargo.toml", "old\n"),
            |root| {
                write_atomic(root.join("lib/Cargo.toml"), b"new\n").unwrap();
            },
            |test| test.expect_file_content("lib/Cargo.toml", "new\n"),
        );
    }

    #[test]
    fn test_write_atomic_creates_missing() {
        TempTestEnv::run(
            |test| test.setup_dir("lib"),
            |root| {
                write_atomic(root.join("lib/Cargo.toml"), b"new\n").unwrap();
            },
            |test| test.expect_file_content("lib/Cargo.toml", "new\n"),
        );
    }

    #[test]
    fn test_write_atomic_missing_parent() {
        TempTestEnv::run(
            |test| test,
            |root| {
                let err = write_atomic(root.join("lib/Cargo.toml"), b"new\n").unwrap_err();
                assert!(io_not_found(&err));
            },
            |test| test,
        );
    }

    #[test]
    fn test_write_atomic_keeps_unrelated_hidden_files() {
        TempTestEnv::run(
            |test| {
                test.setup_file("lib/Cargo.toml", "old\n")
                    .setup_file("lib/.Cargo.toml.version-sync.tmp", "user data\n")
            },
            |root| {
                write_atomic(root.join("lib/Cargo.toml"), b"new\n").unwrap();
            },
            |test| {
                test.expect_file_content("lib/Cargo.toml", "new\n")
                    .expect_file_content("lib/.Cargo.toml.version-sync.tmp", "user data\n")
            },
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_failure_leaves_no_temp_file() {
        TempTestEnv::run(
            |test| test.setup_dir("lib/Cargo.toml"),
            |root| {
                write_atomic(root.join("lib/Cargo.toml"), b"new\n").unwrap_err();
            },
            |test| test.expect_dir("lib/Cargo.toml"),
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_write_follows_symlink() {
        use std::os::unix::fs::symlink;

        for write in [write_atomic::<PathBuf>, write_in_place::<PathBuf>] {
            TempTestEnv::run(
                |test| test.setup_file("real/Cargo.toml", "old\n").setup_dir("lib"),
                |root| {
                    let link = root.join("lib/Cargo.toml");
                    symlink(root.join("real/Cargo.toml"), &link).unwrap();

                    write(link.clone(), b"new\n").unwrap();

                    assert!(fs::symlink_metadata(&link).unwrap().is_symlink());
                },
                |test| {
                    test.expect_file_content("real/Cargo.toml", "new\n")
                        .expect_file_content("lib/Cargo.toml", "new\n")
                },
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_write_in_place_read_only_dir() {
        use std::os::unix::fs::PermissionsExt;

        TempTestEnv::run(
            |test| test.setup_file("lib/Cargo.toml", "old\n"),
            |root| {
                let lib = root.join("lib");
                fs::set_permissions(&lib, fs::Permissions::from_mode(0o555)).unwrap();
                let res = write_in_place(lib.join("Cargo.toml"), b"new\n");
                fs::set_permissions(&lib, fs::Permissions::from_mode(0o755)).unwrap();
                res.unwrap();
            },
            |test| test.expect_file_content("lib/Cargo.toml", "new\n"),
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        TempTestEnv::run(
            |test| test.setup_file("Cargo.toml", "old\n"),
            |root| {
                let path = root.join("Cargo.toml");
                fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
                write_atomic(&path, b"new\n").unwrap();

                let mode = fs::metadata(&path).unwrap().permissions().mode();
                assert_eq!(mode & 0o777, 0o640);
            },
            |test| test.expect_file_content("Cargo.toml", "new\n"),
        );
    }
}
