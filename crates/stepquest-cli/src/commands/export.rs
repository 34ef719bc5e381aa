//! Export command - write every recorded day, newest first.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stepquest_core::{ExportFormat, Listing};
use stepquest_service::AppState;

use crate::cli::ExportFileFormat;
use crate::format::FormatOptions;
use crate::style;
use crate::util::write_output;

/// Arguments for the export command.
pub struct ExportArgs {
    pub output: Option<PathBuf>,
    pub format: ExportFileFormat,
    pub quiet: bool,
}

/// Execute the export command.
///
/// An empty store writes nothing, not even to `--output`.
pub fn cmd_export(state: &AppState, args: ExportArgs, opts: &FormatOptions) -> Result<()> {
    let format = match args.format {
        ExportFileFormat::Csv => ExportFormat::Csv,
        ExportFileFormat::Json => ExportFormat::Json,
    };

    let mut buf = Vec::new();
    let written = match state.reconciler.export(format, &mut buf)? {
        Listing::Items(n) => n,
        Listing::Empty => {
            eprintln!("{}", style::format_info("No data to export", opts.no_color));
            return Ok(());
        }
    };

    let content = String::from_utf8(buf).context("Export produced invalid UTF-8")?;
    write_output(args.output.as_ref(), &content)?;

    if let Some(path) = &args.output
        && !args.quiet
    {
        eprintln!(
            "{}",
            style::format_success(
                &format!("Exported {} days to {}", written, path.display()),
                opts.no_color
            )
        );
    }
    Ok(())
}
