use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Create containment visualizations from k-mer sketch comparison results",
    long_about = None
)]
pub struct Cli {
    /// Input CSV file(s) from the sketch comparison step
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Output plot filename
    #[arg(long = "output-plot", default_value = "containment_plot.png")]
    pub output_plot: PathBuf,
    /// Output CSV filename
    #[arg(long = "output-csv", default_value = "containment.csv")]
    pub output_csv: PathBuf,
    /// Enable debug output (file size, raw content, parsed shape)
    #[arg(long)]
    pub debug: bool,
    /// Prefix for the plot title
    #[arg(long = "title-prefix", default_value = "")]
    pub title_prefix: String,
    /// K-mer length used for sketching (reported in the title only)
    #[arg(long, default_value_t = 31)]
    pub kmer: u32,
    /// Minimum depth used for filtering (reported in the title when > 1)
    #[arg(long = "min-depth", default_value_t = 1)]
    pub min_depth: u32,
    /// Scaled value used for sketching (reported in the title only)
    #[arg(long, default_value_t = 100)]
    pub scaled: u32,
    /// Combine multiple CSV files into one multi-sample table and plot
    #[arg(long)]
    pub combined: bool,
    /// Skip plot generation, only process CSV files
    #[arg(long = "no-plot")]
    pub no_plot: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|'); inferred
    /// from the file extension when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Raster resolution multiplier for the output plot
    #[arg(long = "scale-factor", default_value_t = 2)]
    pub scale_factor: u32,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
