use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::binning::accumulator::BinAccumulator;
use crate::binning::normalize::percentage;
use crate::core::reference::ReferenceCatalog;
use crate::utils::format::count_to_f64;

/// Bins whose percentage, for any library, lies outside that library's
/// `mean ± sd_multiplier · sd` over every populated bin of the catalog.
///
/// Bins are returned in catalog order, then increasing bin index.
#[must_use]
pub fn find_outlier_bins(
    catalog: &ReferenceCatalog,
    accumulator: &BinAccumulator,
    sd_multiplier: f64,
) -> Vec<(String, u64)> {
    let bins: Vec<(&str, u64)> = catalog
        .references
        .iter()
        .flat_map(|reference| {
            accumulator
                .bins(&reference.name)
                .map(move |(bin, _)| (reference.name.as_str(), bin))
        })
        .collect();

    if bins.is_empty() {
        return Vec::new();
    }

    let mut outliers = BTreeSet::new();
    for library in accumulator.libraries() {
        let total = accumulator.total(library);
        let percentages: Vec<f64> = bins
            .iter()
            .map(|(reference, bin)| percentage(accumulator.count(reference, *bin, library), total))
            .collect();

        let n = count_to_f64(percentages.len() as u64);
        let mean = percentages.iter().sum::<f64>() / n;
        let variance = percentages.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let sd = variance.sqrt();
        let (low, high) = (mean - sd_multiplier * sd, mean + sd_multiplier * sd);

        for (index, pct) in percentages.iter().enumerate() {
            if *pct < low || *pct > high {
                outliers.insert(index);
            }
        }
    }

    outliers
        .into_iter()
        .map(|index| (bins[index].0.to_string(), bins[index].1))
        .collect()
}

/// Delete outlier bins from the accumulator, returning what was removed.
/// Library totals are not recomputed.
pub fn remove_outlier_bins(
    catalog: &ReferenceCatalog,
    accumulator: &mut BinAccumulator,
    sd_multiplier: f64,
) -> Vec<(String, u64)> {
    let outliers = find_outlier_bins(catalog, accumulator, sd_multiplier);
    for (reference, bin) in &outliers {
        accumulator.remove_bin(reference, *bin);
        debug!(reference = %reference, bin, "Removed outlier bin");
    }
    if !outliers.is_empty() {
        info!(
            removed = outliers.len(),
            sd_multiplier, "Removed outlier bins"
        );
    }
    outliers
}
