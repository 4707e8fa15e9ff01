use std::fmt::Write as _;

use crate::binning::normalize::ReferenceRows;
use crate::core::reference::ReferenceCatalog;

/// Blank lines written after each reference when breaks are requested.
///
/// The count comes from the longest reference and is used for every
/// reference alike: `max_length / bin_size / 10`.
#[must_use]
pub fn break_length(catalog: &ReferenceCatalog, bin_size: u64) -> usize {
    let lines = catalog.max_length() / bin_size.max(1) / 10;
    usize::try_from(lines).unwrap_or(usize::MAX)
}

/// Render the tab-delimited bin table
#[must_use]
pub fn render_bin_table(header: &[String], references: &[ReferenceRows], breaks: usize) -> String {
    let mut out = String::new();
    out.push_str(&header.join("\t"));
    out.push('\n');

    for reference in references {
        for row in &reference.rows {
            out.push_str(&row.to_fields().join("\t"));
            out.push('\n');
        }
        for _ in 0..breaks {
            out.push('\n');
        }
    }

    out
}

/// Number of data rows in a rendered set of references
#[must_use]
pub fn row_count(references: &[ReferenceRows]) -> usize {
    references.iter().map(|r| r.rows.len()).sum()
}

/// Render a short per-reference summary used by `--format text`
#[must_use]
pub fn describe_references(references: &[ReferenceRows]) -> String {
    let mut out = String::new();
    for reference in references {
        let _ = writeln!(out, "  {}: {} bins", reference.reference, reference.rows.len());
    }
    out
}
