//! Canonical in-memory tables and combined-table persistence.

use std::path::Path;

use anyhow::{Context, Result};

use crate::{io_utils, schema};

/// One normalized result row. Optional fields stay `None` when their column
/// is absent from the source table or the cell is empty/NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub query_name: String,
    pub containment: f64,
    pub query_md5: Option<String>,
    pub median_abund: Option<f64>,
}

/// An ordered table in canonical form. Presence of the optional columns is a
/// table-level property decided once from the header, not per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalTable {
    pub rows: Vec<ResultRow>,
    pub has_query_md5: bool,
    pub has_median_abund: bool,
}

/// One canonical row tagged with the sample it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRow {
    pub row: ResultRow,
    pub barcode: String,
}

/// Concatenation of canonical tables across samples, in file-arrival order.
/// Optional-column presence is the union over contributing tables.
#[derive(Debug, Clone, Default)]
pub struct CombinedTable {
    pub rows: Vec<CombinedRow>,
    pub has_query_md5: bool,
    pub has_median_abund: bool,
}

impl CombinedTable {
    pub fn push(&mut self, table: CanonicalTable, barcode: &str) {
        self.has_query_md5 |= table.has_query_md5;
        self.has_median_abund |= table.has_median_abund;
        self.rows.extend(table.rows.into_iter().map(|row| CombinedRow {
            row,
            barcode: barcode.to_string(),
        }));
    }

    /// Output header, in canonical order. An empty table reduces to exactly
    /// `query_name,containment,barcode`, which downstream consumers rely on.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec![schema::QUERY_NAME, schema::CONTAINMENT];
        if self.has_query_md5 {
            headers.push(schema::QUERY_MD5);
        }
        if self.has_median_abund {
            headers.push(schema::MEDIAN_ABUND);
        }
        headers.push(schema::BARCODE);
        headers
    }

    /// Persists the table, rows in their current (arrival) order. Writes the
    /// header even when no rows contributed.
    pub fn write_csv(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = io_utils::open_csv_writer(path, delimiter)?;
        writer
            .write_record(self.headers())
            .context("Writing combined headers")?;
        for (idx, combined) in self.rows.iter().enumerate() {
            let row = &combined.row;
            let mut record = vec![row.query_name.clone(), row.containment.to_string()];
            if self.has_query_md5 {
                record.push(row.query_md5.clone().unwrap_or_default());
            }
            if self.has_median_abund {
                record.push(
                    row.median_abund
                        .map(|value| value.to_string())
                        .unwrap_or_default(),
                );
            }
            record.push(combined.barcode.clone());
            writer
                .write_record(&record)
                .with_context(|| format!("Writing combined row {}", idx + 2))?;
        }
        writer.flush().context("Flushing combined output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, containment: f64) -> ResultRow {
        ResultRow {
            query_name: name.to_string(),
            containment,
            query_md5: None,
            median_abund: None,
        }
    }

    #[test]
    fn empty_table_has_exactly_three_headers() {
        let table = CombinedTable::default();
        assert_eq!(table.headers(), vec!["query_name", "containment", "barcode"]);
    }

    #[test]
    fn optional_column_presence_is_the_union_across_tables() {
        let mut combined = CombinedTable::default();
        combined.push(
            CanonicalTable {
                rows: vec![row("NC_1 Ecoli", 0.8)],
                has_query_md5: false,
                has_median_abund: true,
            },
            "sampleA",
        );
        combined.push(
            CanonicalTable {
                rows: vec![row("NC_1 Ecoli", 0.3)],
                has_query_md5: true,
                has_median_abund: false,
            },
            "sample2",
        );
        assert_eq!(
            combined.headers(),
            vec!["query_name", "containment", "query_md5", "median_abund", "barcode"]
        );
        assert_eq!(combined.rows.len(), 2);
        assert_eq!(combined.rows[0].barcode, "sampleA");
        assert_eq!(combined.rows[1].barcode, "sample2");
    }

    #[test]
    fn rows_keep_arrival_order() {
        let mut combined = CombinedTable::default();
        combined.push(
            CanonicalTable {
                rows: vec![row("NC_10 Ecoli", 0.4), row("NC_2 Ecoli", 0.9)],
                ..CanonicalTable::default()
            },
            "s1",
        );
        let names: Vec<&str> = combined
            .rows
            .iter()
            .map(|combined| combined.row.query_name.as_str())
            .collect();
        assert_eq!(names, vec!["NC_10 Ecoli", "NC_2 Ecoli"]);
    }
}
