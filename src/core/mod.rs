//! Core data types for read binning.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceSequence`](reference::ReferenceSequence) and
//!   [`ReferenceCatalog`](reference::ReferenceCatalog): the ordered references reads are binned against
//! - [`SequenceDictionary`](header::SequenceDictionary): the `@SQ` entries of one input header
//! - [`AlignmentRecord`](record::AlignmentRecord): the fields of one alignment that binning uses
//! - [`Mode`](types::Mode), [`FlagPair`](types::FlagPair), [`LibraryName`](types::LibraryName)
//! - [`BinningConfig`](config::BinningConfig): immutable run settings
//!
//! ## Modes
//!
//! | Mode | Input | Accepted |
//! |------|-------|----------|
//! | S    | single-end | FLAG 0 or 16 |
//! | PS   | paired | every mate independently |
//! | TP   | paired | proper forward/reverse pairs |
//! | TPI  | paired | TP + odd inserts up to 2kb |
//! | TPM  | paired | TP + same-strand pairs |
//! | TPA  | paired | TPI + TPM + same-strand odd inserts |

pub mod config;
pub mod header;
pub mod record;
pub mod reference;
pub mod types;
