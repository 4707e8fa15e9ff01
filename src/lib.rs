//! # bin-by-sam
//!
//! A library for counting aligned reads in fixed-width genomic bins across
//! several sequencing libraries at once.
//!
//! Every alignment file is one library. Reads (or read pairs) that pass the
//! run's mode and mapping-quality rules are assigned to a bin by their
//! midpoint, and each bin is reported with the raw count of every library and
//! a ploidy-scaled ratio against a control library or the library mean.
//!
//! ## Features
//!
//! - **Six pairing modes**: single-end, independent mates, and four levels of
//!   pair strictness driven by the FLAG pair and insert size
//! - **SAM, gzipped SAM and BAM** input via noodles
//! - **Reference exclusion**: drop references named in a SAM header file
//! - **Normalization**: per-library percentages scaled by ploidy, against a
//!   control or the mean of all libraries
//! - **Outlier-bin removal**: optional pruning of bins far from the mean
//!
//! ## Example
//!
//! ```rust,no_run
//! use bin_by_sam::{normalize, plan_libraries, run, BinningConfig, Mode};
//! use std::path::PathBuf;
//!
//! let config = BinningConfig::new(Mode::S);
//! let inputs = plan_libraries(&[PathBuf::from("a_aln.sam")]).unwrap();
//! let result = run(&config, &inputs, None).unwrap();
//!
//! for reference in normalize(&config, &result.catalog, &result.accumulator).unwrap() {
//!     for row in reference.rows {
//!         println!("{}", row.to_fields().join("\t"));
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Core data types for references, records, modes and configuration
//! - [`parsing`]: SAM/BAM readers, exclusion lists and input enumeration
//! - [`binning`]: Classification, accumulation, normalization and the run pipeline
//! - [`output`]: Bin table and stats report writers
//! - [`cli`]: Command-line interface implementation

pub mod binning;
pub mod cli;
pub mod core;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use binning::accumulator::BinAccumulator;
pub use binning::normalize::normalize;
pub use binning::pipeline::{plan_libraries, run, BinningRun, LibraryInput};
pub use binning::{BinningError, ErrorKind};
pub use core::config::BinningConfig;
pub use core::record::AlignmentRecord;
pub use core::reference::{ReferenceCatalog, ReferenceSequence};
pub use core::types::*;
