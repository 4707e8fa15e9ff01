use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::binning::accumulator::BinAccumulator;
use crate::core::reference::ReferenceCatalog;
use crate::utils::format::{count_to_f64, format_decimal, round_to};

/// Prefix of the stats report file name
pub const STATS_PREFIX: &str = "readcounts-";

/// Accepted reads for one library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStats {
    pub library: String,
    pub reads: u64,
    /// Reads per megabase of binned reference, rounded to 2 decimals
    pub reads_per_mb: f64,
}

/// Reads removed for one excluded reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedStats {
    pub reference: String,
    pub reads: u64,
}

/// The stats report beside `output`: `readcounts-<file name>` in the same directory
#[must_use]
pub fn stats_report_path(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{STATS_PREFIX}{file_name}"))
}

/// Per-library read counts and densities, in run order
#[must_use]
pub fn library_stats(catalog: &ReferenceCatalog, accumulator: &BinAccumulator) -> Vec<LibraryStats> {
    let megabases = count_to_f64(catalog.total_length()) / 1_000_000.0;

    accumulator
        .libraries()
        .iter()
        .map(|library| {
            let reads = accumulator.total(library);
            let reads_per_mb = if megabases > 0.0 {
                round_to(count_to_f64(reads) / megabases, 2)
            } else {
                0.0
            };
            LibraryStats {
                library: library.to_string(),
                reads,
                reads_per_mb,
            }
        })
        .collect()
}

/// Reads removed per entry of the user exclusion list, in list order.
/// Empty when no exclusion list was supplied.
#[must_use]
pub fn excluded_stats(catalog: &ReferenceCatalog, accumulator: &BinAccumulator) -> Vec<ExcludedStats> {
    catalog
        .exclusions
        .iter()
        .flatten()
        .map(|reference| ExcludedStats {
            reference: reference.name.clone(),
            reads: accumulator.excluded_count(&reference.name),
        })
        .collect()
}

/// Render the stats report. The removed-reference section appears only when
/// an exclusion list was supplied.
#[must_use]
pub fn render_stats_report(
    libraries: &[LibraryStats],
    catalog: &ReferenceCatalog,
    accumulator: &BinAccumulator,
) -> String {
    let mut out = String::from("Lib\tReads\tReads/MB\n");
    for stats in libraries {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            stats.library,
            stats.reads,
            format_decimal(stats.reads_per_mb)
        ));
    }

    if catalog.exclusions.is_some() {
        out.push_str("\n\nRemoved Reference Counts:\n");
        out.push_str("Reference\tReads\n");
        for excluded in excluded_stats(catalog, accumulator) {
            out.push_str(&format!("{}\t{}\n", excluded.reference, excluded.reads));
        }
    }

    out
}
