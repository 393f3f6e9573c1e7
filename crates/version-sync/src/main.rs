//! Synchronizes a version from a version file into a manifest.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre;
use termcolor::{StandardStream, WriteColor};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

use crate::cli::options::CliArguments;
use crate::cli::{CheckFailure, Context, OperationFailure};
use crate::ui::Ui;

mod cli;
mod ui;

fn main() -> ExitCode {
    match main_impl() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::from(cli::EXIT_ERROR)
        }
    }
}

fn main_impl() -> eyre::Result<ExitCode> {
    let args = CliArguments::parse();

    color_eyre::install()?;

    let cc = match args.output.color {
        clap::ColorChoice::Auto => termcolor::ColorChoice::Auto,
        clap::ColorChoice::Always => termcolor::ColorChoice::Always,
        clap::ColorChoice::Never => termcolor::ColorChoice::Never,
    };

    let ui = Ui::new(cc, cc);

    // this is a hack, termcolor does not expose any way for us to easily reuse
    // their internal mechanism of checking whether the given stream is color
    // capable without constructing a stream and asking for it
    let tracing_ansi =
        StandardStream::stderr(ui::check_terminal(io::stderr(), cc)).supports_color();

    tracing_subscriber::registry()
        .with(
            HierarchicalLayer::new(4)
                .with_targets(true)
                .with_ansi(tracing_ansi),
        )
        .with(Targets::new().with_target(
            version_sync_core::LOG_TARGET,
            match args.output.verbose {
                0 => LevelFilter::OFF,
                1 => LevelFilter::ERROR,
                2 => LevelFilter::WARN,
                3 => LevelFilter::INFO,
                4 => LevelFilter::DEBUG,
                5.. => LevelFilter::TRACE,
            },
        ))
        .init();

    let mut ctx = Context::new(&args, &ui);

    let exit_code = match ctx.run() {
        Ok(()) => cli::EXIT_OK,
        Err(err) => 'err: {
            let root = err.root_cause();

            for cause in err.chain() {
                if let Some(CheckFailure) = cause.downcast_ref() {
                    break 'err cli::EXIT_CHECK_FAILURE;
                }

                if let Some(OperationFailure) = cause.downcast_ref() {
                    break 'err cli::EXIT_OPERATION_FAILURE;
                }
            }

            // output piped into a closed reader, e.g. `--dry-run | head`
            if root
                .downcast_ref()
                .map(io::Error::kind)
                .is_some_and(|kind| kind == io::ErrorKind::BrokenPipe)
            {
                break 'err cli::EXIT_OK;
            }

            writeln!(
                ctx.ui.error()?,
                "version-sync ran into an unexpected error, this is most likely a bug"
            )?;
            writeln!(
                ctx.ui.hint()?,
                "Please consider reporting this at {}/issues/new",
                std::env!("CARGO_PKG_REPOSITORY")
            )?;
            writeln!(ctx.ui.error()?, "{err:?}")?;

            cli::EXIT_ERROR
        }
    };

    ctx.ui.flush()?;

    Ok(ExitCode::from(exit_code))
}
