use std::collections::{BTreeMap, HashMap};

use crate::binning::classifier::Placement;
use crate::core::types::LibraryName;

/// Per-library counts of one bin; a missing library is an implicit zero
pub type BinCounts = HashMap<LibraryName, u64>;

/// Accepted-read counts keyed by reference, then bin index, then library.
///
/// Alongside the table it keeps each library's accepted total and the number
/// of reads that landed on excluded or unknown references.
#[derive(Debug, Clone, Default)]
pub struct BinAccumulator {
    /// reference -> bin index -> library -> count
    counts: HashMap<String, BTreeMap<u64, BinCounts>>,

    /// Libraries in registration order
    libraries: Vec<LibraryName>,

    /// library -> accepted reads
    totals: HashMap<LibraryName, u64>,

    /// excluded reference -> reads removed
    excluded: BTreeMap<String, u64>,

    /// unknown reference -> reads dropped
    unknown: BTreeMap<String, u64>,
}

impl BinAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library to the run with a zero total. Registering twice is a no-op.
    pub fn register_library(&mut self, library: &LibraryName) {
        if !self.totals.contains_key(library) {
            self.libraries.push(library.clone());
            self.totals.insert(library.clone(), 0);
        }
    }

    /// Count one accepted read in `bin` of `reference` for `library`
    pub fn record(&mut self, reference: &str, bin: u64, library: &LibraryName) {
        self.register_library(library);

        *self
            .counts
            .entry(reference.to_string())
            .or_default()
            .entry(bin)
            .or_default()
            .entry(library.clone())
            .or_default() += 1;
        *self.totals.entry(library.clone()).or_default() += 1;
    }

    /// Tally one read removed by the exclusion list
    pub fn record_excluded(&mut self, reference: &str) {
        *self.excluded.entry(reference.to_string()).or_default() += 1;
    }

    /// Tally one read dropped for an unknown reference
    pub fn record_unknown(&mut self, reference: &str) {
        *self.unknown.entry(reference.to_string()).or_default() += 1;
    }

    /// Apply a classifier placement for `library`
    pub fn apply(&mut self, placement: &Placement, library: &LibraryName) {
        match placement {
            Placement::Bin { reference, bin } => self.record(reference, *bin, library),
            Placement::Excluded { reference } => self.record_excluded(reference),
            Placement::Unknown { reference } => self.record_unknown(reference),
        }
    }

    /// Fold another accumulator into this one, summing every counter.
    /// Libraries new to this accumulator are appended in the other's order.
    pub fn merge(&mut self, other: BinAccumulator) {
        for library in &other.libraries {
            self.register_library(library);
        }

        for (reference, bins) in other.counts {
            let target = self.counts.entry(reference).or_default();
            for (bin, bin_counts) in bins {
                let target_counts = target.entry(bin).or_default();
                for (library, count) in bin_counts {
                    *target_counts.entry(library).or_default() += count;
                }
            }
        }

        for (library, total) in other.totals {
            *self.totals.entry(library).or_default() += total;
        }
        for (reference, count) in other.excluded {
            *self.excluded.entry(reference).or_default() += count;
        }
        for (reference, count) in other.unknown {
            *self.unknown.entry(reference).or_default() += count;
        }
    }

    #[must_use]
    pub fn libraries(&self) -> &[LibraryName] {
        &self.libraries
    }

    /// Accepted reads for `library` (0 when unregistered)
    #[must_use]
    pub fn total(&self, library: &LibraryName) -> u64 {
        self.totals.get(library).copied().unwrap_or(0)
    }

    /// Count for one (reference, bin, library), 0 when absent
    #[must_use]
    pub fn count(&self, reference: &str, bin: u64, library: &LibraryName) -> u64 {
        self.counts
            .get(reference)
            .and_then(|bins| bins.get(&bin))
            .and_then(|bin_counts| bin_counts.get(library))
            .copied()
            .unwrap_or(0)
    }

    /// Populated bins of `reference` in increasing bin order
    pub fn bins(&self, reference: &str) -> impl Iterator<Item = (u64, &BinCounts)> {
        self.counts
            .get(reference)
            .into_iter()
            .flat_map(|bins| bins.iter().map(|(bin, counts)| (*bin, counts)))
    }

    /// Sum of `library`'s counts over every bin of `reference`
    #[must_use]
    pub fn reference_total(&self, reference: &str, library: &LibraryName) -> u64 {
        self.bins(reference)
            .map(|(_, counts)| counts.get(library).copied().unwrap_or(0))
            .sum()
    }

    /// Delete a bin. Library totals are left untouched.
    pub fn remove_bin(&mut self, reference: &str, bin: u64) -> bool {
        self.counts
            .get_mut(reference)
            .is_some_and(|bins| bins.remove(&bin).is_some())
    }

    #[must_use]
    pub fn excluded_count(&self, reference: &str) -> u64 {
        self.excluded.get(reference).copied().unwrap_or(0)
    }

    /// Reads dropped per unknown reference
    #[must_use]
    pub fn unknown(&self) -> &BTreeMap<String, u64> {
        &self.unknown
    }
}
