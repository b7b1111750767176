//! Combined mode: aggregate samples into one long-format table and chart it.

use std::path::Path;

use anyhow::Result;
use log::{info, warn};

use crate::{
    chart,
    cli::Cli,
    fallback::{self, PlaceholderReason},
    io_utils,
    load::{self, LoadOutcome},
    table::CombinedTable,
    title_options,
};

pub fn execute(args: &Cli) -> Result<()> {
    let mut combined = CombinedTable::default();
    for input in &args.inputs {
        if !input.exists() {
            warn!("Skipping {input:?}: file does not exist");
            continue;
        }
        match load::read_table(input, args.delimiter)? {
            LoadOutcome::Loaded(table) => {
                let barcode = sample_label(input);
                info!(
                    "✓ Aggregated {input:?} as '{barcode}' ({} row(s))",
                    table.rows.len()
                );
                combined.push(table, &barcode);
            }
            LoadOutcome::EmptyInput => warn!("Skipping {input:?}: file is empty"),
            LoadOutcome::NoMatches => warn!("Skipping {input:?}: no rows"),
            LoadOutcome::SchemaMismatch(report) => warn!("Skipping {input:?}: {report}"),
        }
    }

    // Persisted whether or not anything contributed; an empty table still
    // carries the expected header for downstream consumers.
    let delimiter = io_utils::resolve_output_delimiter(&args.output_csv, None);
    combined.write_csv(&args.output_csv, delimiter)?;
    if combined.rows.is_empty() {
        warn!("No valid input files contributed rows");
        info!("Empty CSV saved to {:?}", args.output_csv);
    } else {
        info!(
            "Combined CSV saved to {:?} ({} row(s))",
            args.output_csv,
            combined.rows.len()
        );
    }

    if args.no_plot {
        info!("Skipping plot generation; CSV saved to {:?}", args.output_csv);
        return Ok(());
    }
    if combined.rows.is_empty() {
        fallback::write_placeholder(&args.output_plot, &PlaceholderReason::NoValidData)?;
        return Ok(());
    }

    let spec = chart::combined(&combined, &title_options(args));
    chart::render(&spec, &args.output_plot, args.scale_factor)?;
    info!("Combined plot saved to {:?}", args.output_plot);
    Ok(())
}

/// The sample label is the input's base name with its extension removed;
/// labels are not required to be unique across inputs.
fn sample_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_labels_drop_the_trailing_extension() {
        assert_eq!(sample_label(Path::new("runs/sampleA.csv")), "sampleA");
        assert_eq!(sample_label(Path::new("sample2.search.csv")), "sample2.search");
        assert_eq!(sample_label(Path::new("barcode01")), "barcode01");
    }
}
