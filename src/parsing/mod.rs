//! Readers for alignment inputs and the files that configure a run.
//!
//! This module provides:
//!
//! - **SAM/BAM files**: headers and alignment records via noodles, with
//!   gzip-compressed SAM decoded through flate2
//! - **Exclusion lists**: SAM header files whose `@SQ` lines name references to drop
//! - **Input enumeration**: list files and directory scans
//!
//! ## Example
//!
//! ```rust,no_run
//! use bin_by_sam::parsing::sam::AlignmentFile;
//! use std::path::Path;
//!
//! let file = AlignmentFile::open(Path::new("sample_aln.sam.gz")).unwrap();
//! println!("{} references", file.dictionary().len());
//! for record in file {
//!     let record = record.unwrap();
//!     println!("{} {}", record.name, record.flag);
//! }
//! ```
//!
//! ## Record Fields
//!
//! | SAM column | Field | Notes |
//! |------------|-------|-------|
//! | QNAME | `name` | |
//! | FLAG  | `flag` | |
//! | RNAME | `reference` | `None` for `*` |
//! | POS   | `position` | 1-based, 0 when unavailable |
//! | MAPQ  | `mapping_quality` | 255 when missing |
//! | CIGAR | `has_cigar` | false for `*` |
//! | TLEN  | `insert_size` | signed |
//! | SEQ   | `sequence_length` | |

pub mod inputs;
pub mod sam;
