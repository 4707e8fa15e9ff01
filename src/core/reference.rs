use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::header::SequenceDictionary;

/// Reference names that are never binned, whatever the exclusion list says
pub const ALWAYS_EXCLUDED: [&str; 2] = ["ChrUn", "ChrSy"];

/// A single reference sequence (`@SQ` line)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSequence {
    /// Sequence name (SN tag)
    pub name: String,

    /// Sequence length in bp (LN tag)
    pub length: u64,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// How a reference name relates to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStatus {
    /// Binned and reported
    Included,
    /// Removed before binning; reads are tallied separately
    Excluded,
    /// Absent from the defining header and not excluded
    Unknown,
}

/// The ordered set of references that reads are binned against.
///
/// Built once from the first input file's header and reused for every
/// library. All inputs are assumed to share that header; later headers can be
/// checked with [`ReferenceCatalog::foreign_references`].
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    /// Binned references, in header order
    pub references: Vec<ReferenceSequence>,

    /// User-supplied exclusion list, in file order (None when not supplied)
    pub exclusions: Option<Vec<ReferenceSequence>>,

    /// Index: name -> position in `references`
    name_to_index: HashMap<String, usize>,

    /// Every excluded name, including the built-in ones
    excluded_names: HashSet<String>,

    /// Every name in the defining header, whether binned or not
    header_names: HashSet<String>,
}

impl ReferenceCatalog {
    /// Build the catalog from a header and an optional exclusion list.
    ///
    /// Zero-length references, the built-in exclusions and every name on the
    /// exclusion list are left out of the binned set.
    #[must_use]
    pub fn from_header(
        header: &SequenceDictionary,
        exclusions: Option<Vec<ReferenceSequence>>,
    ) -> Self {
        let mut excluded_names: HashSet<String> =
            ALWAYS_EXCLUDED.iter().map(|s| (*s).to_string()).collect();
        if let Some(list) = &exclusions {
            excluded_names.extend(list.iter().map(|r| r.name.clone()));
        }

        let mut references = Vec::new();
        let mut name_to_index = HashMap::new();
        let mut header_names = HashSet::new();

        for reference in &header.references {
            header_names.insert(reference.name.clone());
            if reference.length == 0 || excluded_names.contains(&reference.name) {
                continue;
            }
            if name_to_index.contains_key(&reference.name) {
                continue;
            }
            name_to_index.insert(reference.name.clone(), references.len());
            references.push(reference.clone());
        }

        Self {
            references,
            exclusions,
            name_to_index,
            excluded_names,
            header_names,
        }
    }

    #[must_use]
    pub fn status(&self, name: &str) -> ReferenceStatus {
        if self.excluded_names.contains(name) {
            ReferenceStatus::Excluded
        } else if self.name_to_index.contains_key(name) {
            ReferenceStatus::Included
        } else {
            ReferenceStatus::Unknown
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Sum of all binned reference lengths
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.references.iter().map(|r| r.length).sum()
    }

    /// Length of the longest binned reference (0 for an empty catalog)
    #[must_use]
    pub fn max_length(&self) -> u64 {
        self.references.iter().map(|r| r.length).max().unwrap_or(0)
    }

    /// Names in `header` that the defining header never mentioned
    #[must_use]
    pub fn foreign_references(&self, header: &SequenceDictionary) -> Vec<String> {
        header
            .references
            .iter()
            .filter(|r| !self.header_names.contains(&r.name))
            .map(|r| r.name.clone())
            .collect()
    }
}
