//! Single-file mode: pass the table through, then chart it.

use std::fs;

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info};

use crate::{
    chart::{self, SortKeyMode},
    cli::Cli,
    fallback::{self, PlaceholderReason},
    load::{self, LoadOutcome},
    title_options,
};

pub fn execute(args: &Cli) -> Result<()> {
    let input = args
        .inputs
        .first()
        .ok_or_else(|| anyhow!("At least one input file must be provided"))?;

    if args.debug {
        let size = fs::metadata(input)
            .with_context(|| format!("Inspecting input file {input:?}"))?
            .len();
        debug!("CSV file size: {size} bytes");
        let content =
            fs::read_to_string(input).with_context(|| format!("Reading input file {input:?}"))?;
        debug!("CSV file contents: {content:?}");
    }

    // The table output is a pass-through copy, written before any outcome is
    // decided so downstream consumers find it even for invalid input.
    if input != &args.output_csv {
        fs::copy(input, &args.output_csv)
            .with_context(|| format!("Copying {input:?} to {:?}", args.output_csv))?;
    }

    match load::read_table(input, args.delimiter)? {
        LoadOutcome::EmptyInput => {
            error!("CSV file is empty: {input:?}");
            fallback::write_placeholder(&args.output_plot, &PlaceholderReason::EmptyInput)?;
            Ok(())
        }
        LoadOutcome::NoMatches => {
            info!("No containment results found in {input:?}");
            fallback::write_placeholder(&args.output_plot, &PlaceholderReason::NoMatches)?;
            Ok(())
        }
        _ if args.no_plot => {
            info!("Skipping plot generation; CSV saved to {:?}", args.output_csv);
            Ok(())
        }
        LoadOutcome::SchemaMismatch(report) => {
            error!("{report}");
            fallback::write_placeholder(
                &args.output_plot,
                &PlaceholderReason::SchemaMismatch(report),
            )?;
            Ok(())
        }
        LoadOutcome::Loaded(table) => {
            let spec = chart::single(&table, &title_options(args), SortKeyMode::default());
            chart::render(&spec, &args.output_plot, args.scale_factor)?;
            info!("Plot saved to {:?}", args.output_plot);
            info!("CSV saved to {:?}", args.output_csv);
            Ok(())
        }
    }
}
