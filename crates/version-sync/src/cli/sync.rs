use std::io::Write;

use color_eyre::eyre;
use version_sync_core::{Mode, VersionSync};

use super::{CheckFailure, Context, OperationFailure};

pub fn run(ctx: &mut Context) -> eyre::Result<()> {
    let root = ctx.root()?;
    let config = ctx.config(&root)?;
    let mode = ctx.args.mode();

    let sync = VersionSync::from_config(&root, &config);
    tracing::info!(
        version_file = ?sync.version_file(),
        manifest = ?sync.manifest(),
        ?mode,
        "syncing version"
    );

    let report = match sync.run(mode) {
        Ok(report) => report,
        Err(err) => {
            ctx.error_sync(&root, &err)?;
            eyre::bail!(OperationFailure);
        }
    };

    tracing::info!(
        version = %report.version(),
        rewritten = report.rewritten(),
        changed = report.changed(),
        written = report.written(),
        "synced version"
    );

    match mode {
        Mode::Write => {}
        Mode::Check => {
            if report.changed() {
                ctx.error_out_of_sync(&root, sync.manifest(), report.version())?;
                eyre::bail!(CheckFailure);
            }
        }
        Mode::DryRun => {
            let mut out = ctx.ui.stdout();
            out.write_all(report.manifest().as_bytes())?;
            out.flush()?;
        }
    }

    Ok(())
}
