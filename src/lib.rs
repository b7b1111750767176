pub mod chart;
pub mod cli;
pub mod combine;
pub mod fallback;
pub mod io_utils;
pub mod load;
pub mod natural;
pub mod schema;
pub mod single;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, error};

use crate::{chart::TitleOptions, cli::Cli, fallback::PlaceholderReason};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging(debug: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            let level = if debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            builder.filter_module("containment_report", level);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Entry point behind `main`. Recoverable conditions (empty input, no
/// matches, schema mismatch, nothing to aggregate) are handled where they
/// are detected and complete normally; anything else lands here, where a
/// best-effort placeholder is written before the failure is signaled.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let result = if cli.combined {
        combine::execute(&cli)
    } else {
        single::execute(&cli)
    };
    if let Err(err) = result {
        error!("Processing failed: {err:#}");
        let reason = PlaceholderReason::Failure(format!("{err:#}"));
        if let Err(placeholder_err) = fallback::write_placeholder(&cli.output_plot, &reason) {
            error!(
                "Failed to write placeholder {:?}: {placeholder_err:#}",
                cli.output_plot
            );
        }
        return Err(err);
    }
    Ok(())
}

pub(crate) fn title_options(cli: &Cli) -> TitleOptions {
    TitleOptions {
        prefix: cli.title_prefix.clone(),
        kmer: cli.kmer,
        scaled: cli.scaled,
        min_depth: cli.min_depth,
    }
}
