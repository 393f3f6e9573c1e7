use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser};
use version_sync_core::config::ConfigLayer;
use version_sync_core::sync::Mode;

// TODO: use built in negation once in clap
// See: https://github.com/clap-rs/clap/issues/815

/// A trait for switches, i.e. options which come in pairs of flags and inverse
/// flags.
pub trait Switch: Sized {
    /// The default value, if no flag was used.
    const DEFAULT: bool;

    /// Return whichever flag was last set.
    fn get(self) -> Option<bool>;

    /// Return whichever flag was last set or the default.
    fn get_or_default(self) -> bool {
        self.get().unwrap_or(Self::DEFAULT)
    }
}

macro_rules! impl_switch {
    (
        $(#[$switch_meta:meta])*
        $switch:ident($default:literal) {
            $(#[$field_meta:meta])*
            $field:ident,

            $(#[$no_field_meta:meta])*
            $no_field:ident,
        }
    ) => {
        $(#[$switch_meta])*
        #[derive(Args, Clone, Copy)]
        pub struct $switch {
            $(#[$field_meta])*
            #[arg(long, hide_short_help = !$default)]
            $field: bool,

            $(#[$no_field_meta])*
            #[arg(
                long,
                hide_short_help = $default,
                overrides_with = stringify!($field),
            )]
            $no_field: bool,
        }

        impl std::fmt::Debug for $switch {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($switch)).field(&self.get_or_default()).finish()
            }
        }

        impl Switch for $switch {
            const DEFAULT: bool = $default;

            fn get(self) -> Option<bool> {
                if self.$field {
                    Some(true)
                } else if self.$no_field {
                    Some(false)
                } else {
                    None
                }
            }
        }
    };
}

impl_switch! {
    /// The `--[no-]atomic` switch.
    AtomicSwitch(false) {
        /// Replace the manifest through a temporary file
        ///
        /// The new manifest is written next to the old one and renamed over
        /// it, a failed write never leaves a partially written manifest. The
        /// manifest's directory must be writable.
        atomic,
        /// Truncate and write the manifest in place (default)
        no_atomic,
    }
}

macro_rules! ansi {
    ($s:expr; b) => {
        concat!("\x1B[1m", $s, "\x1B[0m")
    };
    ($s:expr; u) => {
        concat!("\x1B[4m", $s, "\x1B[0m")
    };
    ($s:expr;) => {
        $s
    };
    ($s:expr; $first:ident $( + $rest:tt)*) => {
        ansi!(ansi!($s; $($rest)*); $first)
    };
}

// NOTE: we use clap style formatting here and keep it simple to avoid a proc
// macro dependency for a single use of static ansi formatting
#[rustfmt::skip]
static AFTER_LONG_ABOUT: &str = concat!(
    ansi!("Exit Codes:\n"; u + b),
    "  ", ansi!("0"; b), "  Success\n",
    "  ", ansi!("1"; b), "  The manifest is out of sync (--check)\n",
    "  ", ansi!("2"; b), "  The requested operation failed\n",
    "  ", ansi!("3"; b), "  An unexpected error occurred",
);

/// Write the version from a version file into a manifest's version field
///
/// Every line of the manifest which starts with `version =` is replaced by
/// `version = "<VERSION>"`, all other lines are left untouched.
#[derive(Parser, Debug, Clone)]
#[command(version, after_long_help = AFTER_LONG_ABOUT)]
pub struct CliArguments {
    /// The project root directory
    ///
    /// Relative paths of the version file and manifest are resolved against
    /// this directory. If none is given, the current directory is used.
    #[arg(long, short, env = "VERSION_SYNC_ROOT")]
    pub root: Option<PathBuf>,

    /// The file to read the version from [default: version]
    #[arg(long, value_name = "PATH", env = "VERSION_SYNC_VERSION_FILE")]
    pub version_file: Option<PathBuf>,

    /// The manifest to write the version to [default: lib/Cargo.toml]
    #[arg(long, short, value_name = "PATH", env = "VERSION_SYNC_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Only check whether the manifest is in sync, don't write it
    ///
    /// Exits with 1 if the manifest would be changed.
    #[arg(long, conflicts_with = "dry_run")]
    pub check: bool,

    /// Print the updated manifest to stdout instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub atomic: AtomicSwitch,

    #[command(flatten, next_help_heading = "Output Options")]
    pub output: OutputArgs,
}

impl CliArguments {
    /// The mode to run the sync in.
    pub fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Write
        }
    }

    /// The config layer of the command line arguments and environment
    /// variables.
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            version_file: self.version_file.clone(),
            manifest: self.manifest.clone(),
            atomic: self.atomic.get(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// When to use colorful output
    ///
    /// If set to auto, color will only be enabled if a capable terminal is
    /// detected.
    #[clap(
        long,
        value_name = "WHEN",
        require_equals = true,
        num_args = 0..=1,
        default_value = "auto",
        default_missing_value = "always",
    )]
    pub color: ColorChoice,

    /// Produce more logging output [-v ... -vvvvv]
    ///
    /// Logs are written to stderr, the increasing number of verbose flags
    /// corresponds to the log levels ERROR, WARN, INFO, DEBUG, TRACE.
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_verify_cli() {
        CliArguments::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = CliArguments::try_parse_from(["version-sync"]).unwrap();
        assert_eq!(args.mode(), Mode::Write);
        assert_eq!(args.config_layer(), ConfigLayer::default());
        assert!(!args.atomic.get_or_default());
    }

    #[test]
    fn test_config_layer() {
        let args = CliArguments::try_parse_from([
            "version-sync",
            "--version-file",
            "VERSION",
            "-m",
            "Cargo.toml",
            "--atomic",
            "--no-atomic",
        ])
        .unwrap();

        assert_eq!(
            args.config_layer(),
            ConfigLayer {
                version_file: Some("VERSION".into()),
                manifest: Some("Cargo.toml".into()),
                atomic: Some(false),
            }
        );
    }

    #[test]
    fn test_mode() {
        let args = CliArguments::try_parse_from(["version-sync", "--check"]).unwrap();
        assert_eq!(args.mode(), Mode::Check);

        let args = CliArguments::try_parse_from(["version-sync", "--dry-run"]).unwrap();
        assert_eq!(args.mode(), Mode::DryRun);

        assert!(CliArguments::try_parse_from(["version-sync", "--check", "--dry-run"]).is_err());
    }
}
