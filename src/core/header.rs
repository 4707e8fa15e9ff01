use serde::{Deserialize, Serialize};

use crate::core::reference::ReferenceSequence;

/// The `@SQ` entries of one alignment file's header, in header order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceDictionary {
    /// Source file path (if known)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// All references from @SQ lines
    pub references: Vec<ReferenceSequence>,
}

impl SequenceDictionary {
    #[must_use]
    pub fn new(references: Vec<ReferenceSequence>) -> Self {
        Self {
            source: None,
            references,
        }
    }

    /// Set the source file path
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
