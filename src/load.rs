//! Reading one result file into canonical form.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::debug;

use crate::{
    io_utils,
    schema::{self, ColumnMap, ColumnReport},
    table::{CanonicalTable, ResultRow},
};

/// Terminal states of loading a single file. Only malformed content is an
/// error; everything else here is a recoverable outcome the caller turns
/// into a placeholder (or skips, in combined mode).
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(CanonicalTable),
    /// The file has zero bytes.
    EmptyInput,
    /// The header parsed but no data rows followed.
    NoMatches,
    /// Required canonical fields are absent under every known convention.
    SchemaMismatch(ColumnReport),
}

/// Parses `path` into a [`CanonicalTable`] or one of the terminal outcomes.
///
/// The empty check precedes parsing, the no-rows check precedes schema
/// adaptation, and adaptation precedes any row conversion, so a rejected
/// table is never partially normalized.
pub fn read_table(path: &Path, delimiter: Option<u8>) -> Result<LoadOutcome> {
    let size = fs::metadata(path)
        .with_context(|| format!("Inspecting input file {path:?}"))?
        .len();
    if size == 0 {
        return Ok(LoadOutcome::EmptyInput);
    }

    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let mut reader = io_utils::open_csv_reader(path, delimiter)?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Reading header of {path:?}"))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        records.push(record);
    }

    debug!("CSV columns: {headers:?}");
    debug!("CSV shape: ({} rows, {} columns)", records.len(), headers.len());
    for record in records.iter().take(5) {
        debug!("row: {record:?}");
    }

    if records.is_empty() {
        return Ok(LoadOutcome::NoMatches);
    }

    let map = match schema::adapt_headers(&headers) {
        Ok(map) => map,
        Err(report) => return Ok(LoadOutcome::SchemaMismatch(report)),
    };

    let mut rows = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        rows.push(
            convert_row(record, &map)
                .with_context(|| format!("Row {} in {path:?}", row_idx + 2))?,
        );
    }

    Ok(LoadOutcome::Loaded(CanonicalTable {
        rows,
        has_query_md5: map.query_md5.is_some(),
        has_median_abund: map.median_abund.is_some(),
    }))
}

fn convert_row(record: &csv::StringRecord, map: &ColumnMap) -> Result<ResultRow> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let containment_raw = field(map.containment);
    let containment: f64 = containment_raw
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse '{containment_raw}' as containment"))?;
    Ok(ResultRow {
        query_name: field(map.query_name).to_string(),
        containment,
        query_md5: map.query_md5.map(|idx| field(idx).to_string()),
        median_abund: match map.median_abund {
            Some(idx) => parse_median_abund(field(idx))?,
            None => None,
        },
    })
}

/// Median abundance is absent when the cell is empty or the literal `NaN`
/// the upstream tool writes for references without depth information.
fn parse_median_abund(value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let parsed: f64 = trimmed
        .parse()
        .with_context(|| format!("Failed to parse '{value}' as median abundance"))?;
    Ok(if parsed.is_nan() { None } else { Some(parsed) })
}
