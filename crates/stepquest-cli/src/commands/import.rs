//! Import command - merge `date,steps` CSV into the store.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use stepquest_service::AppState;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_import_text};

/// Execute the import command. `-` reads from stdin.
pub fn cmd_import(
    state: &AppState,
    file: &Path,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    let report = if file == Path::new("-") {
        state.reconciler.import_csv(io::stdin().lock())?
    } else {
        let reader = File::open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        state.reconciler.import_csv(BufReader::new(reader))?
    };

    let output = match format {
        OutputFormat::Json => opts.as_json(&report)?,
        OutputFormat::Text => format_import_text(&report, opts),
    };
    print!("{}", output);
    Ok(())
}
