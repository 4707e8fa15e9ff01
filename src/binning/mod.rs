//! Read classification, bin accumulation and normalization.
//!
//! This module provides the binning engine:
//!
//! - [`Classifier`](classifier::Classifier): decides whether a record (single-end) or a
//!   mate pair (paired modes) is countable and where it lands
//! - [`BinAccumulator`](accumulator::BinAccumulator): reference -> bin -> library counts,
//!   plus per-library totals and excluded-reference tallies
//! - [`normalize`](normalize::normalize): turns counts into ploidy-scaled relative values
//! - [`remove_outlier_bins`](outliers::remove_outlier_bins): optional pruning of extreme bins
//! - [`run`](pipeline::run): drives all of the above over a set of libraries
//!
//! ## Pair Classification
//!
//! Paired records are read two at a time. The sorted FLAG pair decides
//! acceptance, first match wins:
//!
//! | Sorted FLAGs | Accepted when |
//! |--------------|---------------|
//! | 99/147, 83/163 | always |
//! | 81/161, 97/145 | \|TLEN\| < 2001 and mode is TPI, TPA or PS |
//! | 67/131, 115/179 | mode is TPM, TPA or PS |
//! | 65/129, 113/177 | \|TLEN\| < 2001 and mode is TPA or PS |
//! | 77/141 | never |
//! | anything else | mode is PS |
//!
//! ## Example
//!
//! ```rust,no_run
//! use bin_by_sam::binning::pipeline::{plan_libraries, run};
//! use bin_by_sam::core::config::BinningConfig;
//! use bin_by_sam::core::types::Mode;
//! use std::path::PathBuf;
//!
//! let mut config = BinningConfig::new(Mode::Tp);
//! config.bin_size = 100_000;
//!
//! let inputs = plan_libraries(&[PathBuf::from("a_aln.sam"), PathBuf::from("b_aln.sam")]).unwrap();
//! let result = run(&config, &inputs, None).unwrap();
//! for library in result.accumulator.libraries() {
//!     println!("{library}: {}", result.accumulator.total(library));
//! }
//! ```

use thiserror::Error;

use crate::core::types::{FlagPair, Mode};
use crate::parsing::sam::ParseError;

pub mod accumulator;
pub mod classifier;
pub mod normalize;
pub mod outliers;
pub mod pipeline;

/// Machine-readable category of a fatal binning error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The run was configured inconsistently with itself or with the data
    Configuration,
    /// Mates in a paired stream are not adjacent
    StreamIntegrity,
    /// An input could not be read or decoded
    Input,
}

/// A condition that aborts the whole run
#[derive(Error, Debug)]
pub enum BinningError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "FLAG {flag} on read '{read}' looks like paired-end data; select a paired mode (PS, TP, TPI, TPM or TPA)"
    )]
    SingleEndModeMismatch { read: String, flag: u16 },

    #[error(
        "FLAGs {flags} on read '{read}' are inconsistent with paired mode {mode}; select mode S for single-end data"
    )]
    PairedModeMismatch {
        read: String,
        flags: FlagPair,
        mode: Mode,
    },

    #[error(
        "Mates out of sync: '{first}' (FLAG {first_flag}) is followed by '{second}' (FLAG {second_flag}); input must keep mates adjacent"
    )]
    MateNameMismatch {
        first: String,
        first_flag: u16,
        second: String,
        second_flag: u16,
    },

    #[error("Read '{read}' has no mate before the end of {path}")]
    UnpairedRecord { read: String, path: String },

    #[error("Reference '{reference}' in {path} is not in the header of the first input")]
    ForeignReference { reference: String, path: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl BinningError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::SingleEndModeMismatch { .. }
            | Self::PairedModeMismatch { .. }
            | Self::ForeignReference { .. } => ErrorKind::Configuration,
            Self::MateNameMismatch { .. } | Self::UnpairedRecord { .. } => {
                ErrorKind::StreamIntegrity
            }
            Self::Parse(_) => ErrorKind::Input,
        }
    }
}
