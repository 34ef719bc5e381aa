//! List command - stored days, weeks or months.

use anyhow::Result;
use serde::Serialize;
use stepquest_core::Listing;
use stepquest_service::AppState;
use stepquest_store::StepStore;
use stepquest_types::format_date;

use crate::cli::{ListGrouping, OutputFormat};
use crate::format::{FormatOptions, format_days_text, format_months_text, format_weeks_text};
use crate::style;

/// Arguments for the list command.
pub struct ListArgs {
    pub by: ListGrouping,
    /// 0 shows everything.
    pub limit: usize,
}

/// Execute the list command.
pub fn cmd_list(
    state: &AppState,
    args: ListArgs,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    let metrics = state.reconciler.metrics();
    let output = match args.by {
        ListGrouping::Day => render(metrics.daily_list()?, &args, format, opts, format_days_text)?,
        ListGrouping::Week => {
            render(metrics.weekly_totals()?, &args, format, opts, format_weeks_text)?
        }
        ListGrouping::Month => {
            render(metrics.monthly_totals()?, &args, format, opts, format_months_text)?
        }
    };
    print!("{}", output);

    if format == OutputFormat::Text
        && let Some((first, last)) = state.store.date_span()?
    {
        println!(
            "{} days recorded, {} to {}",
            state.store.count()?,
            format_date(first),
            format_date(last)
        );
    }
    Ok(())
}

fn render<T: Serialize>(
    listing: Listing<Vec<T>>,
    args: &ListArgs,
    format: OutputFormat,
    opts: &FormatOptions,
    text: fn(&[T], usize, &FormatOptions) -> String,
) -> Result<String> {
    let items = listing.into_option().unwrap_or_default();
    match format {
        OutputFormat::Json => {
            let shown = if args.limit == 0 {
                &items[..]
            } else {
                &items[..args.limit.min(items.len())]
            };
            opts.as_json(&shown)
        }
        OutputFormat::Text if items.is_empty() => Ok(format!(
            "{}\n",
            style::format_info("No step data recorded yet", opts.no_color)
        )),
        OutputFormat::Text => Ok(text(&items, args.limit, opts)),
    }
}
