//! Canonical column model and header adaptation across naming conventions.
//!
//! Two generations of the upstream sketch-comparison tool emit the same
//! semantic fields under different column names. Rather than branching on a
//! tool version anywhere else, this module holds one declarative mapping
//! table per convention, tried in priority order; a new convention is added
//! by appending a table here, nowhere else.

use std::fmt;

/// Canonical column names. These double as the combined-output wire format.
pub const QUERY_NAME: &str = "query_name";
pub const CONTAINMENT: &str = "containment";
pub const QUERY_MD5: &str = "query_md5";
pub const MEDIAN_ABUND: &str = "median_abund";
pub const BARCODE: &str = "barcode";

/// One recognized header naming convention, as source-column names for each
/// canonical field. `query_name` and `containment` are required; the rest
/// are picked up when present.
struct Convention {
    name: &'static str,
    query_name: &'static str,
    containment: &'static str,
    query_md5: &'static str,
    median_abund: Option<&'static str>,
}

const CONVENTIONS: &[Convention] = &[
    // prefetch/gather output, also the combined wire format
    Convention {
        name: "prefetch",
        query_name: "query_name",
        containment: "containment",
        query_md5: "query_md5",
        median_abund: Some("median_abund"),
    },
    // search output carries a similarity instead of a containment and has
    // no abundance column
    Convention {
        name: "search",
        query_name: "name",
        containment: "similarity",
        query_md5: "md5",
        median_abund: None,
    },
];

/// Column indices of the canonical fields within one adapted header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub convention: &'static str,
    pub query_name: usize,
    pub containment: usize,
    pub query_md5: Option<usize>,
    pub median_abund: Option<usize>,
}

/// Why no convention matched: the canonical fields that could not be
/// satisfied and the columns that were actually present. Rendered verbatim
/// into both the log and the placeholder artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReport {
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

impl fmt::Display for ColumnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing columns: {}; available columns: {}",
            self.missing.join(", "),
            if self.available.is_empty() {
                "(none)".to_string()
            } else {
                self.available.join(", ")
            }
        )
    }
}

/// Adapts a raw header row to the canonical schema.
///
/// The first convention whose required source columns are all present wins.
/// On failure the report names the missing canonical fields under the
/// closest-matching convention.
pub fn adapt_headers(headers: &[String]) -> Result<ColumnMap, ColumnReport> {
    let find = |source: &str| headers.iter().position(|header| header.trim() == source);

    for convention in CONVENTIONS {
        if let (Some(query_name), Some(containment)) =
            (find(convention.query_name), find(convention.containment))
        {
            return Ok(ColumnMap {
                convention: convention.name,
                query_name,
                containment,
                query_md5: find(convention.query_md5),
                median_abund: convention.median_abund.and_then(find),
            });
        }
    }

    // No full match; report against the convention that came closest,
    // earlier tables winning ties.
    let mut best = &CONVENTIONS[0];
    let mut best_matches = 0usize;
    for convention in CONVENTIONS {
        let matches = usize::from(find(convention.query_name).is_some())
            + usize::from(find(convention.containment).is_some());
        if matches > best_matches {
            best = convention;
            best_matches = matches;
        }
    }

    let mut missing = Vec::new();
    if find(best.query_name).is_none() {
        missing.push(QUERY_NAME.to_string());
    }
    if find(best.containment).is_none() {
        missing.push(CONTAINMENT.to_string());
    }
    Err(ColumnReport {
        missing,
        available: headers.to_vec(),
    })
}
