//! Placeholder artifacts written where the chart image was expected.
//!
//! Downstream pipeline stages look for a file at the image path and must
//! find one on every run. A placeholder carries the same name and extension
//! as the real image and holds a short plain-text reason instead; consumers
//! distinguish the two by attempting to decode the file, never by name.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::schema::ColumnReport;

/// Why the chart was replaced by a placeholder. The rendered text is the
/// placeholder's entire content, so the messages are part of the contract.
#[derive(Debug, Error)]
pub enum PlaceholderReason {
    #[error("No data to visualize - CSV file is empty")]
    EmptyInput,
    #[error("No matches found")]
    NoMatches,
    #[error("{0}")]
    SchemaMismatch(ColumnReport),
    #[error("No valid data found")]
    NoValidData,
    #[error("Error: {0}")]
    Failure(String),
}

pub fn write_placeholder(path: &Path, reason: &PlaceholderReason) -> Result<()> {
    fs::write(path, reason.to_string())
        .with_context(|| format!("Writing placeholder to {path:?}"))?;
    Ok(())
}
