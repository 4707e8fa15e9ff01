use std::collections::BTreeSet;

use tracing::info;

use crate::binning::BinningError;
use crate::core::config::BinningConfig;
use crate::core::record::AlignmentRecord;
use crate::core::reference::{ReferenceCatalog, ReferenceStatus};
use crate::core::types::{FlagPair, Mode, MAX_RELAXED_INSERT};

/// Records above this FLAG (secondary, supplementary, duplicate) are skipped in paired modes
pub const MAX_PAIRED_FLAG: u16 = 200;

/// Single-end FLAGs strictly inside this range mean paired input was given to mode S
const PAIRED_FLAG_RANGE: (u16, u16) = (80, 2000);

/// The lowest sorted FLAG a paired-mode pair may carry
const MIN_PAIRED_FLAG: u16 = 60;

const PROPER: &[(u16, u16)] = &[(99, 147), (83, 163)];
const ODD_INSERT: &[(u16, u16)] = &[(81, 161), (97, 145)];
const SAME_STRAND: &[(u16, u16)] = &[(67, 131), (115, 179)];
const SAME_STRAND_ODD_INSERT: &[(u16, u16)] = &[(65, 129), (113, 177)];
const BOTH_UNMAPPED: FlagPair = FlagPair(77, 141);

/// Where one countable read lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// A bin of a catalog reference
    Bin { reference: String, bin: u64 },
    /// A reference on the exclusion list
    Excluded { reference: String },
    /// A reference neither in the catalog nor excluded
    Unknown { reference: String },
}

/// Whether a sorted flag pair is countable under `mode`.
///
/// `insert_size` is mate 1's TLEN; it only matters for the odd-insert classes.
#[must_use]
pub fn accepts_pair(mode: Mode, flags: FlagPair, insert_size: i64) -> bool {
    let plausible_insert = insert_size.abs() < MAX_RELAXED_INSERT;

    if flags.is_one_of(PROPER) {
        true
    } else if flags.is_one_of(ODD_INSERT) && plausible_insert && mode.allows_odd_insert() {
        true
    } else if flags.is_one_of(SAME_STRAND) && mode.allows_same_strand() {
        true
    } else if flags.is_one_of(SAME_STRAND_ODD_INSERT)
        && plausible_insert
        && mode.allows_same_strand_odd_insert()
    {
        true
    } else if flags == BOTH_UNMAPPED {
        false
    } else {
        mode.is_independent()
    }
}

/// Midpoint of the zone spanned by both mates
#[must_use]
pub fn pair_midpoint(first: &AlignmentRecord, second: &AlignmentRecord) -> u64 {
    let zone_start = first
        .position
        .min(first.end())
        .min(second.position)
        .min(second.end());
    let zone_end = first
        .position
        .max(first.end())
        .max(second.position)
        .max(second.end());
    (zone_end - zone_start + 1) / 2 + zone_start
}

/// Decides which records count and which bin they land in.
///
/// One classifier serves the whole run so that each accepted flag pair is
/// reported only the first time it is seen.
#[derive(Debug)]
pub struct Classifier<'a> {
    config: &'a BinningConfig,
    catalog: &'a ReferenceCatalog,
    seen_pairs: BTreeSet<FlagPair>,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub fn new(config: &'a BinningConfig, catalog: &'a ReferenceCatalog) -> Self {
        Self {
            config,
            catalog,
            seen_pairs: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Flag pairs accepted so far, in sorted order
    #[must_use]
    pub fn seen_pairs(&self) -> &BTreeSet<FlagPair> {
        &self.seen_pairs
    }

    /// Classify one record in single-end mode.
    ///
    /// # Errors
    ///
    /// Returns `BinningError::SingleEndModeMismatch` if the FLAG indicates
    /// paired-end data.
    pub fn classify_single(
        &self,
        record: &AlignmentRecord,
    ) -> Result<Option<Placement>, BinningError> {
        let Some(reference) = record.reference.as_deref() else {
            return Ok(None);
        };

        if record.flag > PAIRED_FLAG_RANGE.0 && record.flag < PAIRED_FLAG_RANGE.1 {
            return Err(BinningError::SingleEndModeMismatch {
                read: record.name.clone(),
                flag: record.flag,
            });
        }

        if record.flag != 0 && record.flag != 16 {
            return Ok(None);
        }

        if record.mapping_quality < self.config.min_mapq {
            return Ok(None);
        }

        Ok(Some(self.place(reference, record.midpoint())))
    }

    /// Classify two consecutive records as mates.
    ///
    /// Returns no placement for a discarded pair, one for a pair binned as a
    /// fragment, and up to two in PS mode where mates are binned on their own.
    ///
    /// # Errors
    ///
    /// Returns `BinningError::MateNameMismatch` if the records are not mates,
    /// or `BinningError::PairedModeMismatch` if the FLAGs cannot come from a
    /// paired run.
    pub fn classify_pair(
        &mut self,
        first: &AlignmentRecord,
        second: &AlignmentRecord,
    ) -> Result<Vec<Placement>, BinningError> {
        if first.name != second.name {
            return Err(BinningError::MateNameMismatch {
                first: first.name.clone(),
                first_flag: first.flag,
                second: second.name.clone(),
                second_flag: second.flag,
            });
        }

        let flags = FlagPair::new(first.flag, second.flag);
        if flags.low() < MIN_PAIRED_FLAG {
            return Err(BinningError::PairedModeMismatch {
                read: first.name.clone(),
                flags,
                mode: self.config.mode,
            });
        }

        if !accepts_pair(self.config.mode, flags, first.insert_size) {
            return Ok(Vec::new());
        }

        if self.seen_pairs.insert(flags) {
            info!(flags = %flags, mode = %self.config.mode, "Accepting flag pair");
        }

        if self.config.mode.is_independent() {
            return Ok([first, second]
                .into_iter()
                .filter_map(|mate| self.classify_mate(mate))
                .collect());
        }

        let Some(reference) = first.reference.as_deref() else {
            return Ok(Vec::new());
        };

        // A low-MAPQ pair is still tallied when its reference is excluded
        let min_mapq = self.config.min_mapq;
        if first.mapping_quality < min_mapq || second.mapping_quality < min_mapq {
            return Ok(match self.catalog.status(reference) {
                ReferenceStatus::Excluded => vec![Placement::Excluded {
                    reference: reference.to_string(),
                }],
                _ => Vec::new(),
            });
        }

        Ok(vec![self.place(reference, pair_midpoint(first, second))])
    }

    /// One mate of a PS-mode pair, binned under its own reference.
    fn classify_mate(&self, mate: &AlignmentRecord) -> Option<Placement> {
        // Strictly greater than the minimum here; every other path uses >=
        if !mate.has_cigar || mate.mapping_quality <= self.config.min_mapq {
            return None;
        }
        let reference = mate.reference.as_deref()?;
        Some(self.place(reference, mate.midpoint()))
    }

    fn place(&self, reference: &str, midpoint: u64) -> Placement {
        match self.catalog.status(reference) {
            ReferenceStatus::Included => Placement::Bin {
                reference: reference.to_string(),
                bin: midpoint / self.config.bin_size,
            },
            ReferenceStatus::Excluded => Placement::Excluded {
                reference: reference.to_string(),
            },
            ReferenceStatus::Unknown => Placement::Unknown {
                reference: reference.to_string(),
            },
        }
    }
}
