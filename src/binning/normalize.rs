use crate::binning::accumulator::BinAccumulator;
use crate::binning::BinningError;
use crate::core::config::BinningConfig;
use crate::core::reference::ReferenceCatalog;
use crate::core::types::LibraryName;
use crate::utils::format::{count_to_f64, format_decimal, round_to};

/// Column name used in place of a control library when normalizing against the mean
pub const MEAN_CONTROL_LABEL: &str = "NA";

/// Ploidy-scaled coverage of one library in one bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelativeValue {
    Value(f64),
    /// The control library has no reads in this bin
    Undefined,
}

impl std::fmt::Display for RelativeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", format_decimal(*v)),
            Self::Undefined => write!(f, "."),
        }
    }
}

/// One output row: a bin with its raw counts and, unless coverage-only, its relative values
#[derive(Debug, Clone, PartialEq)]
pub struct BinRow {
    pub reference: String,
    /// 1-based first position
    pub start: u64,
    /// Last position, clamped to the reference length for its final bin
    pub end: u64,
    /// Raw counts, one per library in run order
    pub counts: Vec<u64>,
    /// Relative values, one per library; empty in coverage-only mode
    pub relative: Vec<RelativeValue>,
}

impl BinRow {
    #[must_use]
    pub fn to_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(3 + self.counts.len() + self.relative.len());
        fields.push(self.reference.clone());
        fields.push(self.start.to_string());
        fields.push(self.end.to_string());
        fields.extend(self.counts.iter().map(ToString::to_string));
        fields.extend(self.relative.iter().map(ToString::to_string));
        fields
    }
}

/// The rows of one catalog reference, kept together so writers can separate references
#[derive(Debug, Clone)]
pub struct ReferenceRows {
    pub reference: String,
    pub rows: Vec<BinRow>,
}

/// Fraction of a library's accepted reads that fall in a bin (0.0 for an empty library)
#[must_use]
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count_to_f64(count) / count_to_f64(total)
    }
}

/// Scale each library's percentage against the control's, or against the mean
/// of all libraries when `control` is None.
#[must_use]
pub fn relative_values(
    percentages: &[f64],
    control: Option<usize>,
    ploidy: u32,
) -> Vec<RelativeValue> {
    let ploidy = f64::from(ploidy);

    // A zero mean prints 0.0 while a zero control prints "."; both are part of the output format.
    match control.and_then(|i| percentages.get(i).copied()) {
        Some(control_pct) => percentages
            .iter()
            .map(|pct| {
                if control_pct == 0.0 {
                    RelativeValue::Undefined
                } else {
                    RelativeValue::Value(round_to(pct / control_pct * ploidy, 3))
                }
            })
            .collect(),
        None => {
            #[allow(clippy::cast_precision_loss)]
            let mean = percentages.iter().sum::<f64>() / percentages.len().max(1) as f64;
            percentages
                .iter()
                .map(|pct| {
                    if mean == 0.0 {
                        RelativeValue::Value(0.0)
                    } else {
                        RelativeValue::Value(round_to(pct / mean * ploidy, 3))
                    }
                })
                .collect()
        }
    }
}

/// Column headers: `Chrom Strt End`, one count column per library and, unless
/// coverage-only, one `<lib>/<control>` column per library.
#[must_use]
pub fn table_header(
    libraries: &[LibraryName],
    control: Option<&LibraryName>,
    coverage_only: bool,
) -> Vec<String> {
    let mut header = vec!["Chrom".to_string(), "Strt".to_string(), "End".to_string()];
    header.extend(libraries.iter().map(ToString::to_string));
    if !coverage_only {
        let control = control.map_or(MEAN_CONTROL_LABEL, LibraryName::as_str);
        header.extend(libraries.iter().map(|lib| format!("{lib}/{control}")));
    }
    header
}

/// Walk the catalog in order and each reference's populated bins in
/// increasing order, producing the output rows.
///
/// # Errors
///
/// Returns `BinningError::Config` if the configured control is not one of
/// the accumulated libraries.
pub fn normalize(
    config: &BinningConfig,
    catalog: &ReferenceCatalog,
    accumulator: &BinAccumulator,
) -> Result<Vec<ReferenceRows>, BinningError> {
    let libraries = accumulator.libraries();
    let control = match &config.control {
        Some(name) => Some(libraries.iter().position(|lib| lib == name).ok_or_else(|| {
            BinningError::Config(format!("control library '{name}' is not among the inputs"))
        })?),
        None => None,
    };
    let totals: Vec<u64> = libraries.iter().map(|lib| accumulator.total(lib)).collect();

    let mut output = Vec::with_capacity(catalog.len());
    for reference in &catalog.references {
        let bins: Vec<_> = accumulator.bins(&reference.name).collect();
        let last_bin = bins.last().map(|(bin, _)| *bin);

        let mut rows = Vec::with_capacity(bins.len());
        for (bin, bin_counts) in bins {
            let counts: Vec<u64> = libraries
                .iter()
                .map(|lib| bin_counts.get(lib).copied().unwrap_or(0))
                .collect();

            let relative = if config.coverage_only {
                Vec::new()
            } else {
                let percentages: Vec<f64> = counts
                    .iter()
                    .zip(&totals)
                    .map(|(&count, &total)| percentage(count, total))
                    .collect();
                relative_values(&percentages, control, config.ploidy)
            };

            let end = if Some(bin) == last_bin {
                reference.length
            } else {
                (bin + 1) * config.bin_size
            };

            rows.push(BinRow {
                reference: reference.name.clone(),
                start: bin * config.bin_size + 1,
                end,
                counts,
                relative,
            });
        }

        output.push(ReferenceRows {
            reference: reference.name.clone(),
            rows,
        });
    }

    Ok(output)
}
